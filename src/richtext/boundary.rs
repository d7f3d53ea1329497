// Control boundary scanning
// Control runs are found by walking outward from a caret while neighbouring
// elements share the anchor's control id, stopping at the sentinels.

use super::element::{ControlComponent, Element, Range};

/// Interior of a control run: everything strictly between the leading
/// sentinel at `left_index` and the trailing sentinel after `right_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueBoundary {
    /// Index of the prefix (or last pre-text) element
    pub left_index: usize,
    /// Index of the last interior element; equals `left_index` when empty
    pub right_index: usize,
}

impl ValueBoundary {
    pub fn interior(&self) -> std::ops::Range<usize> {
        self.left_index + 1..self.right_index + 1
    }

    pub fn len(&self) -> usize {
        self.right_index - self.left_index
    }
}

fn stops_left(anchor: &Element, element: &Element) -> bool {
    element.control_id != anchor.control_id || element.control_component.is_leading_sentinel()
}

fn stops_right(anchor: &Element, element: &Element) -> bool {
    element.control_id != anchor.control_id || element.control_component.is_trailing_sentinel()
}

/// Index of the element that ends a leftward scan from `start` (inclusive).
/// Index 0 is never examined, so a run reaching it has no left boundary.
pub fn find_left_boundary(elements: &[Element], start: usize) -> Option<usize> {
    let anchor = elements.get(start)?;
    (1..=start)
        .rev()
        .find(|&index| stops_left(anchor, &elements[index]))
}

/// Index of the element that ends a rightward scan from `start` (exclusive)
fn find_right_stop(elements: &[Element], start: usize) -> Option<usize> {
    let anchor = elements.get(start)?;
    (start + 1..elements.len()).find(|&index| stops_right(anchor, &elements[index]))
}

/// Index of the last element before the trailing stop
pub fn find_right_boundary(elements: &[Element], start: usize) -> Option<usize> {
    find_right_stop(elements, start).map(|index| index - 1)
}

/// Locate the value run around `start`. `None` when either side runs off
/// the list without meeting a sentinel.
pub fn locate_value_boundary(elements: &[Element], start: usize) -> Option<ValueBoundary> {
    let left_index = find_left_boundary(elements, start)?;
    let right_index = find_right_boundary(elements, start)?;
    Some(ValueBoundary {
        left_index,
        right_index,
    })
}

/// VALUE elements of the run around `start`, in document order.
/// Unlike [`locate_value_boundary`] this never fails; a scan that finds no
/// sentinel just stops at the edge of the list.
pub fn collect_value_elements(elements: &[Element], start: usize) -> Vec<Element> {
    if start >= elements.len() {
        return Vec::new();
    }
    let left_edge = find_left_boundary(elements, start).map_or(1, |index| index + 1);
    let right_edge = find_right_stop(elements, start).unwrap_or(elements.len());

    (left_edge..=start)
        .chain(start + 1..right_edge)
        .map(|index| &elements[index])
        .filter(|element| element.control_component == ControlComponent::Value)
        .cloned()
        .collect()
}

/// Normalize a selection that spans sentinels down to the value run.
/// Collapsed ranges are left alone.
pub fn shrink_to_value(elements: &[Element], range: &mut Range) {
    if range.is_collapsed() {
        return;
    }
    let (Some(start_element), Some(end_element)) =
        (elements.get(range.start_index), elements.get(range.end_index))
    else {
        return;
    };

    // Selection covers only the placeholder: collapse onto the leading sentinel
    if start_element.control_component == ControlComponent::Placeholder
        && end_element.control_component == ControlComponent::Placeholder
    {
        if let Some(index) = find_left_boundary(elements, range.start_index) {
            *range = Range::collapsed(index);
        }
        return;
    }

    if start_element.control_component.is_leading_sentinel() {
        let mut index = range.start_index + 1;
        while index < elements.len() {
            let element = &elements[index];
            if element.control_id != start_element.control_id
                || element.control_component == ControlComponent::Value
            {
                range.start_index = index - 1;
                break;
            }
            if element.control_component == ControlComponent::Placeholder {
                *range = Range::collapsed(index - 1);
                return;
            }
            index += 1;
        }
    }

    if end_element.control_component.is_trailing_sentinel() {
        let mut index = range.end_index;
        while index > range.start_index {
            let element = &elements[index];
            if element.control_id != end_element.control_id {
                break;
            }
            if element.control_component == ControlComponent::Value {
                range.end_index = index;
                break;
            }
            index -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str, component: ControlComponent, value: &str) -> Element {
        Element {
            value: value.into(),
            control_id: Some(id.into()),
            control_component: component,
            ..Default::default()
        }
    }

    // "\n" "a" { [ X Y ] } "b"
    fn sample() -> Vec<Element> {
        vec![
            Element::line_break(),
            Element::text("a"),
            part("c1", ControlComponent::Prefix, "{"),
            part("c1", ControlComponent::PreText, "["),
            part("c1", ControlComponent::Value, "X"),
            part("c1", ControlComponent::Value, "Y"),
            part("c1", ControlComponent::PostText, "]"),
            part("c1", ControlComponent::Postfix, "}"),
            Element::text("b"),
        ]
    }

    #[test]
    fn test_locate_value_boundary() {
        let elements = sample();
        for start in 3..=5 {
            let boundary = locate_value_boundary(&elements, start).unwrap();
            assert_eq!(boundary.left_index, 3);
            assert_eq!(boundary.right_index, 5);
            assert_eq!(boundary.interior(), 4..6);
        }
    }

    #[test]
    fn test_locate_empty_interior() {
        let elements = vec![
            Element::line_break(),
            part("c1", ControlComponent::Prefix, "{"),
            part("c1", ControlComponent::Postfix, "}"),
        ];
        let boundary = locate_value_boundary(&elements, 1).unwrap();
        assert_eq!(boundary.left_index, 1);
        assert_eq!(boundary.right_index, 1);
        assert_eq!(boundary.len(), 0);
        assert!(boundary.interior().is_empty());
    }

    #[test]
    fn test_malformed_run_has_no_boundary() {
        // No postfix: the right scan falls off the end
        let elements = vec![
            Element::line_break(),
            part("c1", ControlComponent::Prefix, "{"),
            part("c1", ControlComponent::Value, "X"),
        ];
        assert_eq!(locate_value_boundary(&elements, 2), None);

        // No prefix and the run starts at index 0
        let elements = vec![
            part("c1", ControlComponent::Value, "X"),
            part("c1", ControlComponent::Value, "Y"),
            part("c1", ControlComponent::Postfix, "}"),
        ];
        assert_eq!(locate_value_boundary(&elements, 1), None);
        assert_eq!(locate_value_boundary(&elements, 99), None);
    }

    #[test]
    fn test_collect_value_elements_in_order() {
        let elements = sample();
        for start in 3..=6 {
            let values: String = collect_value_elements(&elements, start)
                .iter()
                .map(|e| e.value.as_str())
                .collect();
            assert_eq!(values, "XY", "caret at {}", start);
        }
        assert!(collect_value_elements(&elements, 1).is_empty());
        assert!(collect_value_elements(&elements, 42).is_empty());
    }

    #[test]
    fn test_shrink_selection_over_sentinels() {
        let elements = sample();

        // Selection from after the prefix to the postfix
        let mut range = Range::new(2, 7);
        shrink_to_value(&elements, &mut range);
        assert_eq!(range, Range::new(3, 5));

        let mut range = Range::new(4, 5);
        shrink_to_value(&elements, &mut range);
        assert_eq!(range, Range::new(4, 5));

        let mut caret = Range::collapsed(2);
        shrink_to_value(&elements, &mut caret);
        assert_eq!(caret, Range::collapsed(2));
    }

    #[test]
    fn test_shrink_selection_over_placeholder() {
        let elements = vec![
            Element::line_break(),
            part("c1", ControlComponent::Prefix, "{"),
            part("c1", ControlComponent::Placeholder, "p"),
            part("c1", ControlComponent::Placeholder, "q"),
            part("c1", ControlComponent::Postfix, "}"),
        ];

        let mut range = Range::new(2, 3);
        shrink_to_value(&elements, &mut range);
        assert_eq!(range, Range::collapsed(1));

        let mut range = Range::new(1, 4);
        shrink_to_value(&elements, &mut range);
        assert_eq!(range, Range::collapsed(1));
    }
}
