// Select Control
// Value engine for single and multi select controls: code <-> text
// translation, rewriting of the value run, key interception and the
// option list popup.

use super::boundary::{collect_value_elements, locate_value_boundary};
use super::control_host::{
    ContentChange, ControlError, ControlHost, ControlPatch, ControlResult, ControlRuleOption,
    ControlTarget, PopupHandle, PopupHost, PopupItem, PopupPosition, RepaintOptions,
};
use super::element::{
    CONTROL_STYLE_ATTRS, Control, ControlComponent, ELEMENT_STYLE_ATTRS, Element, ElementType,
    split_text,
};

/// Separator of the stored code list
pub const VALUE_DELIMITER: &str = ",";
/// Separator of rendered values when the control sets none
pub const DEFAULT_MULTI_SELECT_DELIMITER: &str = ",";

/// Keys a select control intercepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Backspace,
    Delete,
    Other,
}

pub struct SelectControl {
    element: Element,
    is_popup: bool,
    popup: Option<PopupHandle>,
}

impl SelectControl {
    /// `element` is any element of the control run; its descriptor is the
    /// control's state.
    pub fn new(element: Element) -> Self {
        SelectControl {
            element,
            is_popup: false,
            popup: None,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn set_element(&mut self, element: Element) {
        self.element = element;
    }

    pub fn is_popup(&self) -> bool {
        self.is_popup
    }

    fn control(&self) -> Option<&Control> {
        self.element.control.as_ref()
    }

    fn store_code(&mut self, code: Option<String>) {
        if let Some(control) = self.element.control.as_mut() {
            control.code = code;
        }
    }

    /// Currently selected codes
    pub fn codes(&self) -> Vec<String> {
        self.control()
            .and_then(|control| control.code.as_deref())
            .filter(|code| !code.is_empty())
            .map(|code| code.split(VALUE_DELIMITER).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Display text for `codes`. Unknown codes and options without display
    /// text are skipped; `None` when nothing is left.
    pub fn text<S: AsRef<str>>(&self, codes: &[S]) -> Option<String> {
        let control = self.control()?;
        if control.value_sets.is_empty() {
            return None;
        }
        let delimiter = control
            .multi_select_delimiter
            .as_deref()
            .filter(|delimiter| !delimiter.is_empty())
            .unwrap_or(DEFAULT_MULTI_SELECT_DELIMITER);
        let values: Vec<&str> = codes
            .iter()
            .filter_map(|code| {
                control
                    .value_sets
                    .iter()
                    .find(|value_set| value_set.code == code.as_ref())
            })
            .map(|value_set| value_set.value.as_str())
            .filter(|value| !value.is_empty())
            .collect();
        let text = values.join(delimiter);
        (!text.is_empty()).then_some(text)
    }

    /// VALUE elements of the run under the target's caret
    pub fn value(&self, target: &ControlTarget<'_>) -> Vec<Element> {
        collect_value_elements(target.elements, target.range.start_index)
    }

    /// Write `data` straight into the value run, replacing the selection or
    /// the placeholder. Only controls flagged input-able accept this.
    pub fn set_value<H: ControlHost>(
        &mut self,
        data: Vec<Element>,
        target: &mut ControlTarget<'_>,
        host: &mut H,
        options: ControlRuleOption,
    ) -> ControlResult {
        if !self.control().is_some_and(Control::input_able) {
            tracing::debug!("select control rejects direct input");
            return Err(ControlError::InputNotAllowed);
        }
        if !options.is_ignore_disabled_rule && host.is_disabled_control(target) {
            return Err(ControlError::Disabled);
        }
        host.shrink_boundary(target);
        let start_index = target.range.start_index;
        let end_index = target.range.end_index;
        if start_index >= target.elements.len() {
            return Err(ControlError::BoundaryNotFound);
        }

        if start_index != end_index {
            host.splice_element_list(
                target.elements,
                start_index + 1,
                end_index - start_index,
                Vec::new(),
            );
        } else {
            host.remove_placeholder(target, start_index);
        }

        // Non-text anchors and sentinels only lend identity and control style
        let start_element = &target.elements[start_index];
        let anchor = if !start_element.is_text_like()
            || start_element.control_component.is_leading_sentinel()
        {
            start_element.pick_identity(CONTROL_STYLE_ATTRS)
        } else {
            start_element.without_type()
        };

        let start = start_index + 1;
        let count = data.len();
        for (offset, item) in data.iter().enumerate() {
            let mut element = anchor.overlay(item);
            element.control_component = ControlComponent::Value;
            host.format_element(target.elements, &mut element, start_index);
            host.splice_element_list(target.elements, start + offset, 0, vec![element]);
        }
        Ok(start_index + count)
    }

    pub fn keydown<H: ControlHost>(
        &mut self,
        key: ControlKey,
        target: &mut ControlTarget<'_>,
        host: &mut H,
    ) -> ControlResult {
        if host.is_disabled_control(target) {
            return Err(ControlError::Disabled);
        }
        host.shrink_boundary(target);
        let start_index = target.range.start_index;
        let end_index = target.range.end_index;
        let component = |index: usize| {
            target
                .elements
                .get(index)
                .map(|element| element.control_component)
                .unwrap_or_default()
        };
        let start_component = component(start_index);
        let end_component = component(end_index);
        let after_end_component = component(end_index + 1);

        let removes_control = match key {
            ControlKey::Backspace => {
                start_component.is_leading_sentinel()
                    || end_component.is_trailing_sentinel()
                    || start_component == ControlComponent::Placeholder
            }
            ControlKey::Delete => {
                (start_component.is_leading_sentinel()
                    && after_end_component == ControlComponent::Placeholder)
                    || after_end_component.is_trailing_sentinel()
                    || start_component == ControlComponent::Placeholder
            }
            ControlKey::Other => return Ok(end_index),
        };

        if start_index == end_index && removes_control {
            host.remove_control(target, start_index)
        } else {
            self.clear_select(target, host, ControlRuleOption::default())
        }
    }

    pub fn cut<H: ControlHost>(
        &mut self,
        target: &mut ControlTarget<'_>,
        host: &mut H,
    ) -> ControlResult {
        if host.is_disabled_control(target) {
            return Err(ControlError::Disabled);
        }
        host.shrink_boundary(target);
        if target.range.is_collapsed() {
            return Ok(target.range.start_index);
        }
        self.clear_select(target, host, ControlRuleOption::default())
    }

    /// Remove the whole value run and reset the stored code. Returns the
    /// index of the leading sentinel, where the caret belongs afterwards.
    pub fn clear_select<H: ControlHost>(
        &mut self,
        target: &mut ControlTarget<'_>,
        host: &mut H,
        options: ControlRuleOption,
    ) -> ControlResult {
        if !options.is_ignore_disabled_rule && host.is_disabled_control(target) {
            return Err(ControlError::Disabled);
        }
        let Some(boundary) = locate_value_boundary(target.elements, target.range.start_index)
        else {
            tracing::debug!(
                start = target.range.start_index,
                "select control boundary not found"
            );
            return Err(ControlError::BoundaryNotFound);
        };

        let prefix_index = boundary.left_index;
        host.splice_element_list(
            target.elements,
            boundary.interior().start,
            boundary.len(),
            Vec::new(),
        );
        if options.is_add_placeholder {
            host.add_placeholder(target, prefix_index);
        }
        host.set_control_properties(target, prefix_index, &ControlPatch::code(None));
        self.store_code(None);
        Ok(prefix_index)
    }

    /// Select the comma separated `code` list and render its display text
    /// into the value run.
    pub fn set_select<H: ControlHost>(
        &mut self,
        code: &str,
        target: &mut ControlTarget<'_>,
        host: &mut H,
        options: ControlRuleOption,
    ) -> ControlResult<()> {
        if !options.is_ignore_disabled_rule && host.is_disabled_control(target) {
            return Err(ControlError::Disabled);
        }
        let Some(control) = self.control().cloned() else {
            tracing::debug!("select control has no descriptor");
            return Ok(());
        };
        let new_codes: Vec<&str> = code.split(VALUE_DELIMITER).collect();
        let old_code = control.code.as_deref();
        let old_codes: Vec<&str> = old_code
            .map(|old| old.split(VALUE_DELIMITER).collect())
            .unwrap_or_default();
        let had_value = old_code.is_some_and(|old| !old.is_empty());

        let unchanged = if control.is_multi_select {
            old_codes == new_codes
        } else {
            old_code == Some(code)
        };
        if unchanged {
            host.repaint_control(target, RepaintOptions::redraw_only(target.range.start_index));
            self.destroy(host);
            return Ok(());
        }
        if control.value_sets.is_empty() {
            tracing::debug!("select control has no options to render");
            return Ok(());
        }

        let clear_options = ControlRuleOption {
            is_ignore_disabled_rule: options.is_ignore_disabled_rule,
            is_add_placeholder: true,
        };
        let Some(text) = self.text(&new_codes) else {
            if had_value {
                let prefix_index = self.clear_select(target, host, clear_options)?;
                host.repaint_control(target, RepaintOptions::at(prefix_index));
                host.emit_control_content_change(target, ContentChange::Cleared);
            }
            return Ok(());
        };

        // Style comes from the current first value, else from the caret
        let style_donor = match self.value(target).first() {
            Some(element) => element.pick_style(ELEMENT_STYLE_ATTRS),
            None => target
                .element_at(target.range.start_index)
                .map(|element| element.pick_style(CONTROL_STYLE_ATTRS))
                .unwrap_or_default(),
        };
        let prefix_index = self.clear_select(
            target,
            host,
            ControlRuleOption {
                is_add_placeholder: false,
                ..clear_options
            },
        )?;
        if !had_value {
            host.remove_placeholder(target, prefix_index);
        }
        // Everything but style comes from the prefix
        let property_donor = target.elements[prefix_index].omit_style(ELEMENT_STYLE_ATTRS);

        let start = prefix_index + 1;
        let units = split_text(&text);
        for (offset, unit) in units.iter().enumerate() {
            let mut element = style_donor.overlay(&property_donor);
            element.element_type = Some(ElementType::Text);
            element.value = unit.clone();
            element.control_component = ControlComponent::Value;
            host.format_element(target.elements, &mut element, prefix_index);
            host.splice_element_list(target.elements, start + offset, 0, vec![element]);
        }

        host.set_control_properties(
            target,
            prefix_index,
            &ControlPatch::code(Some(code.to_string())),
        );
        self.store_code(Some(code.to_string()));

        if !target.has_context_range {
            host.repaint_control(target, RepaintOptions::at(prefix_index + units.len()));
            host.emit_control_content_change(target, ContentChange::Updated);
            if !control.is_multi_select {
                self.destroy(host);
            }
        }
        Ok(())
    }

    /// Open the option list. Only valid with the caret at the control's
    /// entry point, i.e. the next element belongs to this control.
    pub fn awake<H: ControlHost>(&mut self, target: &ControlTarget<'_>, host: &mut H) {
        if self.is_popup || host.is_disabled_control(target) {
            return;
        }
        let next_control_id = target
            .element_at(target.range.start_index + 1)
            .and_then(|element| element.control_id.as_deref());
        if next_control_id != self.element.control_id.as_deref() {
            return;
        }
        self.popup = self.render_option_list(target, host);
        self.is_popup = true;
    }

    fn render_option_list<H: ControlHost>(
        &self,
        target: &ControlTarget<'_>,
        host: &mut H,
    ) -> Option<PopupHandle> {
        let control = self.control()?;
        if control.value_sets.is_empty() {
            return None;
        }
        let caret = host.caret_position(target)?;
        let codes = self.codes();
        let items = control
            .value_sets
            .iter()
            .map(|value_set| PopupItem {
                code: value_set.code.clone(),
                value: value_set.value.clone(),
                active: codes.contains(&value_set.code),
            })
            .collect();
        let position = PopupPosition {
            left: caret.left,
            top: caret.top + host.pre_y() + caret.line_height,
        };
        Some(host.render_popup(position, items))
    }

    /// Toggle `code` the way a click on its popup entry does. Single select
    /// replaces the selection, or clears it when `code` is already active.
    pub fn select_option<H: ControlHost>(
        &mut self,
        code: &str,
        target: &mut ControlTarget<'_>,
        host: &mut H,
    ) -> ControlResult<()> {
        let Some(control) = self.control() else {
            return Ok(());
        };
        let mut codes = self.codes();
        let existing = codes.iter().position(|active| active == code);
        if control.is_multi_select {
            match existing {
                Some(index) => {
                    codes.remove(index);
                }
                None => codes.push(code.to_string()),
            }
        } else if existing.is_some() {
            codes.clear();
        } else {
            codes = vec![code.to_string()];
        }
        let joined = codes.join(VALUE_DELIMITER);
        self.set_select(&joined, target, host, ControlRuleOption::default())
    }

    /// Close the option list
    pub fn destroy<H: PopupHost>(&mut self, host: &mut H) {
        if !self.is_popup {
            return;
        }
        if let Some(handle) = self.popup.take() {
            host.remove_popup(handle);
        }
        self.is_popup = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ControlOptions;
    use crate::richtext::control_document::{DocumentFramework, build_select_control};
    use crate::richtext::element::{ElementStyle, Range, ValueSet, elements_to_text};

    fn select(control: Control) -> SelectControl {
        SelectControl::new(Element {
            value: "{".into(),
            control_id: Some("c1".into()),
            control_component: ControlComponent::Prefix,
            control: Some(control),
            ..Default::default()
        })
    }

    fn options() -> Vec<ValueSet> {
        vec![
            ValueSet::new("A", "Alpha"),
            ValueSet::new("B", "Beta"),
            ValueSet::new("N", ""),
        ]
    }

    #[test]
    fn test_codes() {
        assert!(select(Control::select(options())).codes().is_empty());
        assert!(
            select(Control::select(options()).with_code(""))
                .codes()
                .is_empty()
        );
        assert_eq!(
            select(Control::select(options()).with_code("A,B")).codes(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_text_joins_known_values() {
        let control = select(Control::select(options()).multi_select(None));
        assert_eq!(control.text(&["A", "B"]).as_deref(), Some("Alpha,Beta"));
        assert_eq!(control.text(&["B", "X", "A"]).as_deref(), Some("Beta,Alpha"));
        assert_eq!(control.text(&["X"]), None);
        assert_eq!(control.text(&["N"]), None);
        assert_eq!(control.text::<&str>(&[]), None);
    }

    #[test]
    fn test_text_uses_multi_select_delimiter() {
        let control = select(Control::select(options()).multi_select(Some(" / ")));
        assert_eq!(control.text(&["A", "B"]).as_deref(), Some("Alpha / Beta"));

        let control = select(Control::select(options()).multi_select(Some("")));
        assert_eq!(control.text(&["A", "B"]).as_deref(), Some("Alpha,Beta"));
    }

    #[test]
    fn test_text_without_options() {
        assert_eq!(select(Control::default()).text(&["A"]), None);
        let bare = SelectControl::new(Element::text("x"));
        assert_eq!(bare.text(&["A"]), None);
        assert!(bare.codes().is_empty());
    }

    #[test]
    fn test_set_element_replaces_state() {
        let mut control = select(Control::select(options()).with_code("A"));
        assert_eq!(control.element().value, "{");
        control.set_element(Element {
            control: Some(Control::select(options()).with_code("B")),
            ..Element::text("}")
        });
        assert_eq!(control.element().value, "}");
        assert_eq!(control.codes(), vec!["B"]);
        assert!(!control.is_popup());
    }

    #[test]
    fn test_set_select_on_plain_targets() {
        let host_options = ControlOptions::default();
        let bold = ElementStyle {
            bold: Some(true),
            ..Default::default()
        };
        let mut elements = vec![Element::line_break()];
        elements.extend(build_select_control(
            "c1",
            Control::select(options()).with_placeholder("pick"),
            bold.clone(),
            &host_options,
        ));
        elements.push(Element::text("y").with_style(ElementStyle {
            italic: Some(true),
            ..Default::default()
        }));
        let mut framework = DocumentFramework::new(host_options);
        let mut control = SelectControl::new(elements[1].clone());

        // Context edits write but never repaint
        let mut target = ControlTarget::in_context(&mut elements, Range::collapsed(1));
        control
            .set_select("B", &mut target, &mut framework, ControlRuleOption::default())
            .unwrap();
        assert_eq!(target.range, Range::collapsed(1));
        assert!(framework.repaints().is_empty());
        assert_eq!(elements_to_text(&elements), "\n{Beta}y");
        for element in &elements[2..6] {
            assert_eq!(element.element_type, Some(ElementType::Text));
            assert_eq!(element.control_component, ControlComponent::Value);
            assert_eq!(element.style, bold);
        }

        let mut target = ControlTarget::live(&mut elements, Range::collapsed(1));
        control
            .set_select("A", &mut target, &mut framework, ControlRuleOption::default())
            .unwrap();
        assert_eq!(target.range, Range::collapsed(6));
        assert_eq!(framework.repaints(), &[RepaintOptions::at(6)]);
        assert_eq!(elements_to_text(&elements), "\n{Alpha}y");
        assert_eq!(elements[2].style, bold);
        assert_eq!(elements[8].style.italic, Some(true));
    }
}
