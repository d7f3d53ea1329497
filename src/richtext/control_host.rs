// Control host interfaces
// The select engine owns no document state. Everything it reads or writes goes
// through a ControlTarget (the element list and caret of one call) and the
// services of a ControlHost (placeholders, control state, repaint, events).

use super::boundary::shrink_to_value;
use super::element::{Control, Element, Range, format_element_context};
use thiserror::Error;

/// Why a control operation refused to run. Always reported before the
/// element list is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("control is disabled")]
    Disabled,
    #[error("control does not accept direct input")]
    InputNotAllowed,
    #[error("control boundary not found")]
    BoundaryNotFound,
}

/// Result of a control operation, usually the new caret index
pub type ControlResult<T = usize> = Result<T, ControlError>;

/// Per-call rule overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRuleOption {
    pub is_ignore_disabled_rule: bool,
    pub is_add_placeholder: bool,
}

impl Default for ControlRuleOption {
    fn default() -> Self {
        ControlRuleOption {
            is_ignore_disabled_rule: false,
            is_add_placeholder: true,
        }
    }
}

impl ControlRuleOption {
    pub fn ignore_disabled() -> Self {
        ControlRuleOption {
            is_ignore_disabled_rule: true,
            ..Default::default()
        }
    }
}

/// Optional override of the sequence and caret an operation runs against,
/// e.g. a header or footer instead of the main body. Absent fields fall back
/// to the live document.
#[derive(Debug, Default)]
pub struct ControlContext<'a> {
    pub elements: Option<&'a mut Vec<Element>>,
    pub range: Option<Range>,
}

impl<'a> ControlContext<'a> {
    pub fn new(elements: &'a mut Vec<Element>, range: Range) -> Self {
        ControlContext {
            elements: Some(elements),
            range: Some(range),
        }
    }
}

/// The element list and caret a single operation works on
#[derive(Debug)]
pub struct ControlTarget<'a> {
    pub elements: &'a mut Vec<Element>,
    pub range: Range,
    /// Range came from a caller-supplied context rather than the live caret.
    /// Such calls never repaint or emit change events.
    pub has_context_range: bool,
    /// Elements came from a caller-supplied context (header, footer, ...)
    /// rather than the live main list.
    pub has_context_elements: bool,
}

impl<'a> ControlTarget<'a> {
    /// Target for a live, caret-driven edit
    pub fn live(elements: &'a mut Vec<Element>, range: Range) -> Self {
        ControlTarget {
            elements,
            range,
            has_context_range: false,
            has_context_elements: false,
        }
    }

    /// Target for an edit against an explicit context
    pub fn in_context(elements: &'a mut Vec<Element>, range: Range) -> Self {
        ControlTarget {
            elements,
            range,
            has_context_range: true,
            has_context_elements: true,
        }
    }

    /// The target is the live main list under the live caret
    pub fn is_live(&self) -> bool {
        !self.has_context_range && !self.has_context_elements
    }

    pub fn element_at(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }
}

/// Partial update of a control descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPatch {
    /// `Some(None)` clears the stored code
    pub code: Option<Option<String>>,
}

impl ControlPatch {
    pub fn code(code: Option<String>) -> Self {
        ControlPatch { code: Some(code) }
    }

    pub fn apply(&self, control: &mut Control) {
        if let Some(code) = &self.code {
            control.code = code.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepaintOptions {
    pub cur_index: usize,
    /// Recompute layout; false only redraws
    pub is_compute: bool,
    pub is_submit_history: bool,
}

impl RepaintOptions {
    pub fn at(cur_index: usize) -> Self {
        RepaintOptions {
            cur_index,
            is_compute: true,
            is_submit_history: true,
        }
    }

    /// Redraw without layout or an undo checkpoint
    pub fn redraw_only(cur_index: usize) -> Self {
        RepaintOptions {
            cur_index,
            is_compute: false,
            is_submit_history: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    /// The control lost its value
    Cleared,
    /// The control's value run was rewritten; read it from the target
    Updated,
}

/// Screen geometry of the caret
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaretPosition {
    pub left: f32,
    pub top: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopupPosition {
    pub left: f32,
    pub top: f32,
}

/// One entry of the option list popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupItem {
    pub code: String,
    pub value: String,
    pub active: bool,
}

/// Opaque reference to a rendered popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupHandle(pub u64);

/// Host surface able to show the option list
pub trait PopupHost {
    fn render_popup(&mut self, position: PopupPosition, items: Vec<PopupItem>) -> PopupHandle;
    fn remove_popup(&mut self, handle: PopupHandle);
}

/// Services the surrounding editor provides to control instances
pub trait ControlHost: PopupHost {
    fn is_disabled_control(&self, target: &ControlTarget<'_>) -> bool;

    /// Ordered mutation primitive. Untouched elements keep their identity.
    fn splice_element_list(
        &mut self,
        elements: &mut Vec<Element>,
        index: usize,
        delete_count: usize,
        insert: Vec<Element>,
    ) {
        let index = index.min(elements.len());
        let end = (index + delete_count).min(elements.len());
        elements.splice(index..end, insert);
    }

    /// Normalize a freshly synthesized element against its neighbours
    fn format_element(&self, elements: &[Element], element: &mut Element, anchor_index: usize) {
        format_element_context(elements, element, anchor_index);
    }

    fn shrink_boundary(&self, target: &mut ControlTarget<'_>) {
        shrink_to_value(target.elements, &mut target.range);
    }

    fn add_placeholder(&mut self, target: &mut ControlTarget<'_>, index: usize);

    fn remove_placeholder(&mut self, target: &mut ControlTarget<'_>, index: usize);

    /// Persist descriptor fields on every element of the control at `index`
    fn set_control_properties(
        &mut self,
        target: &mut ControlTarget<'_>,
        index: usize,
        patch: &ControlPatch,
    );

    /// Delete the whole control instance at `index`, returning the new caret
    fn remove_control(&mut self, target: &mut ControlTarget<'_>, index: usize) -> ControlResult;

    fn repaint_control(&mut self, target: &mut ControlTarget<'_>, options: RepaintOptions);

    fn emit_control_content_change(&mut self, target: &ControlTarget<'_>, change: ContentChange);

    fn caret_position(&self, target: &ControlTarget<'_>) -> Option<CaretPosition>;

    /// Vertical offset of the page the caret is on
    fn pre_y(&self) -> f32;
}
