// In-memory Control Document
// A flat element list with a caret, plus a framework implementing every host
// service the select engine needs: placeholders, descriptor updates, whole
// control removal, repaint/undo bookkeeping, change events and a popup
// surface. Geometry is a fixed-pitch grid, enough to place the popup.

use super::boundary::collect_value_elements;
use super::control_host::{
    CaretPosition, ContentChange, ControlContext, ControlError, ControlHost, ControlPatch,
    ControlResult, ControlTarget, PopupHandle, PopupHost, PopupItem, PopupPosition,
    RepaintOptions,
};
use super::element::{
    CONTROL_STYLE_ATTRS, Control, ControlComponent, Element, ElementStyle, ElementType, Range,
    elements_to_text, split_text,
};
use super::select_control::{SelectControl, VALUE_DELIMITER};
use crate::history::ControlHistory;
use crate::options::ControlOptions;

/// Notification sent to listeners after a control's value changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlChangeEvent {
    pub control_id: Option<String>,
    pub code: Option<String>,
    /// Rendered value, empty when the control was cleared
    pub text: String,
}

/// A popup the framework is currently showing
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPopup {
    pub handle: PopupHandle,
    pub position: PopupPosition,
    pub items: Vec<PopupItem>,
}

pub type ControlChangeListener = Box<dyn FnMut(&ControlChangeEvent)>;

pub struct DocumentFramework {
    options: ControlOptions,
    history: ControlHistory,
    repaints: Vec<RepaintOptions>,
    changes: Vec<ControlChangeEvent>,
    listeners: Vec<ControlChangeListener>,
    popups: Vec<RenderedPopup>,
    next_popup: u64,
}

impl DocumentFramework {
    pub fn new(options: ControlOptions) -> Self {
        DocumentFramework {
            options,
            history: ControlHistory::new(),
            repaints: Vec::new(),
            changes: Vec::new(),
            listeners: Vec::new(),
            popups: Vec::new(),
            next_popup: 1,
        }
    }

    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    pub fn set_design_mode(&mut self, design_mode: bool) {
        self.options.design_mode = design_mode;
    }

    pub fn history(&self) -> &ControlHistory {
        &self.history
    }

    /// Repaint requests in the order they were made
    pub fn repaints(&self) -> &[RepaintOptions] {
        &self.repaints
    }

    /// Change events in the order they were emitted
    pub fn changes(&self) -> &[ControlChangeEvent] {
        &self.changes
    }

    pub fn popups(&self) -> &[RenderedPopup] {
        &self.popups
    }

    pub fn on_control_change(&mut self, listener: impl FnMut(&ControlChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }
}

impl PopupHost for DocumentFramework {
    fn render_popup(&mut self, position: PopupPosition, items: Vec<PopupItem>) -> PopupHandle {
        let handle = PopupHandle(self.next_popup);
        self.next_popup += 1;
        self.popups.push(RenderedPopup {
            handle,
            position,
            items,
        });
        handle
    }

    fn remove_popup(&mut self, handle: PopupHandle) {
        self.popups.retain(|popup| popup.handle != handle);
    }
}

impl ControlHost for DocumentFramework {
    fn is_disabled_control(&self, target: &ControlTarget<'_>) -> bool {
        if self.options.design_mode {
            return false;
        }
        target
            .element_at(target.range.start_index)
            .and_then(|element| element.control.as_ref())
            .is_some_and(|control| control.disabled)
    }

    fn add_placeholder(&mut self, target: &mut ControlTarget<'_>, index: usize) {
        let Some(anchor) = target.element_at(index).cloned() else {
            return;
        };
        let Some(placeholder) = anchor
            .control
            .as_ref()
            .and_then(|control| control.placeholder.as_deref())
            .filter(|placeholder| !placeholder.is_empty())
        else {
            return;
        };

        let style = ElementStyle {
            color: Some(self.options.placeholder_color.clone()),
            ..anchor.style.pick(CONTROL_STYLE_ATTRS)
        };
        for (offset, unit) in split_text(placeholder).into_iter().enumerate() {
            let mut element = Element {
                value: unit,
                element_type: Some(ElementType::Control),
                control_id: anchor.control_id.clone(),
                control_component: ControlComponent::Placeholder,
                control: anchor.control.clone(),
                style: style.clone(),
                ..Default::default()
            };
            self.format_element(target.elements, &mut element, index);
            self.splice_element_list(target.elements, index + offset + 1, 0, vec![element]);
        }
    }

    fn remove_placeholder(&mut self, target: &mut ControlTarget<'_>, index: usize) {
        let Some(control_id) = target
            .element_at(index)
            .map(|element| element.control_id.clone())
        else {
            return;
        };
        let is_placeholder = |element: Option<&Element>| {
            element.is_some_and(|element| element.control_component == ControlComponent::Placeholder)
        };
        if !is_placeholder(target.element_at(index)) && !is_placeholder(target.element_at(index + 1))
        {
            return;
        }

        let mut cursor = index;
        while cursor < target.elements.len() {
            let element = &target.elements[cursor];
            if element.control_id != control_id {
                break;
            }
            if element.control_component == ControlComponent::Placeholder {
                self.splice_element_list(target.elements, cursor, 1, Vec::new());
            } else {
                cursor += 1;
            }
        }
    }

    fn set_control_properties(
        &mut self,
        target: &mut ControlTarget<'_>,
        index: usize,
        patch: &ControlPatch,
    ) {
        let Some(control_id) = target
            .element_at(index)
            .and_then(|element| element.control_id.clone())
        else {
            return;
        };
        let elements = &mut *target.elements;
        let run_start = (0..=index)
            .rev()
            .take_while(|&i| elements[i].belongs_to(&control_id))
            .last()
            .unwrap_or(index);
        let run_end = (index..elements.len())
            .take_while(|&i| elements[i].belongs_to(&control_id))
            .last()
            .unwrap_or(index);
        for element in &mut elements[run_start..=run_end] {
            if let Some(control) = element.control.as_mut() {
                patch.apply(control);
            }
        }
    }

    fn remove_control(&mut self, target: &mut ControlTarget<'_>, index: usize) -> ControlResult {
        let Some(control_id) = target
            .element_at(index)
            .and_then(|element| element.control_id.clone())
        else {
            return Err(ControlError::BoundaryNotFound);
        };
        let elements = &*target.elements;
        let mut left = index;
        while left > 0 && elements[left - 1].belongs_to(&control_id) {
            left -= 1;
        }
        let mut right = index;
        while right + 1 < elements.len() && elements[right + 1].belongs_to(&control_id) {
            right += 1;
        }
        // The caret needs an element in front of the control to rest on
        if left == 0 {
            tracing::debug!(control_id = %control_id, "control starts the document, not removing");
            return Err(ControlError::BoundaryNotFound);
        }

        self.splice_element_list(target.elements, left, right - left + 1, Vec::new());
        Ok(left - 1)
    }

    fn repaint_control(&mut self, target: &mut ControlTarget<'_>, options: RepaintOptions) {
        tracing::trace!(
            cur_index = options.cur_index,
            is_compute = options.is_compute,
            "repaint control"
        );
        target.range = Range::collapsed(options.cur_index);
        if options.is_submit_history && target.is_live() {
            self.history.push(target.elements.clone(), target.range);
        }
        self.repaints.push(options);
    }

    fn emit_control_content_change(&mut self, target: &ControlTarget<'_>, change: ContentChange) {
        let index = target.range.start_index;
        let element = target.element_at(index);
        let control_id = element.and_then(|element| element.control_id.clone());
        let event = match change {
            ContentChange::Cleared => ControlChangeEvent {
                control_id,
                code: None,
                text: String::new(),
            },
            ContentChange::Updated => ControlChangeEvent {
                control_id,
                code: element
                    .and_then(|element| element.control.as_ref())
                    .and_then(|control| control.code.clone()),
                text: elements_to_text(&collect_value_elements(target.elements, index)),
            },
        };
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.changes.push(event);
    }

    fn caret_position(&self, target: &ControlTarget<'_>) -> Option<CaretPosition> {
        let index = target.range.start_index;
        let line = target.elements.get(..=index)?;
        let breaks = line.iter().filter(|element| element.value == "\n").count();
        let line_start = line
            .iter()
            .rposition(|element| element.value == "\n")
            .unwrap_or(0);
        Some(CaretPosition {
            left: (index - line_start) as f32 * self.options.char_width,
            top: breaks.saturating_sub(1) as f32 * self.options.line_height,
            line_height: self.options.line_height,
        })
    }

    fn pre_y(&self) -> f32 {
        self.options.popup_offset_y
    }
}

/// Live element list, caret and the framework serving them
pub struct ControlDocument {
    pub elements: Vec<Element>,
    pub range: Range,
    framework: DocumentFramework,
}

impl ControlDocument {
    pub fn new(elements: Vec<Element>, options: ControlOptions) -> Self {
        let mut framework = DocumentFramework::new(options);
        framework.history.push(elements.clone(), Range::default());
        ControlDocument {
            elements,
            range: Range::default(),
            framework,
        }
    }

    pub fn framework(&self) -> &DocumentFramework {
        &self.framework
    }

    pub fn framework_mut(&mut self) -> &mut DocumentFramework {
        &mut self.framework
    }

    pub fn set_range(&mut self, range: Range) {
        self.range = range;
    }

    /// Run `f` against the sequence and caret selected by `context`, falling
    /// back to the live ones. Calls on the live list with the live caret
    /// write the caret back afterwards.
    pub fn with_target<R>(
        &mut self,
        context: ControlContext<'_>,
        f: impl FnOnce(&mut ControlTarget<'_>, &mut DocumentFramework) -> R,
    ) -> R {
        let has_context_range = context.range.is_some();
        let has_context_elements = context.elements.is_some();
        let range = context.range.unwrap_or(self.range);
        let elements = match context.elements {
            Some(elements) => elements,
            None => &mut self.elements,
        };
        let mut target = ControlTarget {
            elements,
            range,
            has_context_range,
            has_context_elements,
        };
        let result = f(&mut target, &mut self.framework);
        // The caret only tracks the main list
        if target.is_live() {
            self.range = target.range;
        }
        result
    }

    /// Run `f` against the live sequence and caret
    pub fn live<R>(&mut self, f: impl FnOnce(&mut ControlTarget<'_>, &mut DocumentFramework) -> R) -> R {
        self.with_target(ControlContext::default(), f)
    }

    /// Select control instance for the control under the caret
    pub fn active_select(&self) -> Option<SelectControl> {
        let element = self.elements.get(self.range.start_index)?;
        if element.control.is_none() || element.control_component == ControlComponent::Postfix {
            return None;
        }
        Some(SelectControl::new(element.clone()))
    }

    pub fn can_undo(&self) -> bool {
        self.framework.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.framework.history.can_redo()
    }

    /// Restore the previous undo snapshot
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        match self.framework.history.undo() {
            Some(entry) => {
                self.elements = entry.elements.clone();
                self.range = entry.range;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        match self.framework.history.redo() {
            Some(entry) => {
                self.elements = entry.elements.clone();
                self.range = entry.range;
                true
            }
            None => false,
        }
    }

    pub fn text(&self) -> String {
        elements_to_text(&self.elements)
    }
}

/// Index of the prefix of control `control_id`
pub fn find_control_prefix(elements: &[Element], control_id: &str) -> Option<usize> {
    elements.iter().position(|element| {
        element.belongs_to(control_id) && element.control_component == ControlComponent::Prefix
    })
}

/// Build a well-formed select control run: prefix, pre-text, the rendered
/// value of `control.code` (or the placeholder), post-text, postfix.
pub fn build_select_control(
    control_id: &str,
    control: Control,
    style: ElementStyle,
    options: &ControlOptions,
) -> Vec<Element> {
    let part = |value: String, component: ControlComponent| Element {
        value,
        element_type: Some(ElementType::Control),
        control_id: Some(control_id.to_string()),
        control_component: component,
        control: Some(control.clone()),
        style: style.clone(),
        ..Default::default()
    };

    let prefix = part(
        control.prefix.clone().unwrap_or_else(|| options.prefix.clone()),
        ControlComponent::Prefix,
    );
    let text = control.code.as_deref().and_then(|code| {
        let codes: Vec<&str> = code.split(VALUE_DELIMITER).collect();
        SelectControl::new(prefix.clone()).text(&codes)
    });

    let mut elements = vec![prefix];
    for unit in split_text(control.pre_text.as_deref().unwrap_or_default()) {
        elements.push(part(unit, ControlComponent::PreText));
    }
    match text {
        Some(text) => {
            for unit in split_text(&text) {
                elements.push(part(unit, ControlComponent::Value));
            }
        }
        None => {
            for unit in split_text(control.placeholder.as_deref().unwrap_or_default()) {
                let mut placeholder = part(unit, ControlComponent::Placeholder);
                placeholder.style.color = Some(options.placeholder_color.clone());
                elements.push(placeholder);
            }
        }
    }
    for unit in split_text(control.post_text.as_deref().unwrap_or_default()) {
        elements.push(part(unit, ControlComponent::PostText));
    }
    elements.push(part(
        control.postfix.clone().unwrap_or_else(|| options.postfix.clone()),
        ControlComponent::Postfix,
    ));
    elements
}
