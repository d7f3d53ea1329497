// Control Element Model
// A document is a flat list of elements. Controls are not nodes in a tree:
// a control is a contiguous run of elements sharing a control id, and each
// element carries a role tag telling which part of the control it is.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Content kind of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Text,
    Hyperlink,
    Subscript,
    Superscript,
    Control,
    Date,
    Image,
    Table,
    Separator,
    PageBreak,
    Tab,
}

/// Element types whose `value` is literal text
pub const TEXTLIKE_ELEMENT_TYPES: &[ElementType] = &[
    ElementType::Text,
    ElementType::Hyperlink,
    ElementType::Subscript,
    ElementType::Superscript,
    ElementType::Control,
    ElementType::Date,
];

impl ElementType {
    pub fn is_text_like(self) -> bool {
        TEXTLIKE_ELEMENT_TYPES.contains(&self)
    }
}

/// Role of an element inside a control run.
///
/// A well-formed run reads `Prefix, PreText*, (Value* | Placeholder*),
/// PostText*, Postfix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlComponent {
    #[default]
    None,
    Prefix,
    PreText,
    Value,
    PostText,
    Postfix,
    Placeholder,
}

impl ControlComponent {
    /// Prefix or pre-text: stops a leftward scan
    pub fn is_leading_sentinel(self) -> bool {
        matches!(self, ControlComponent::Prefix | ControlComponent::PreText)
    }

    /// Postfix or post-text: stops a rightward scan
    pub fn is_trailing_sentinel(self) -> bool {
        matches!(self, ControlComponent::Postfix | ControlComponent::PostText)
    }

    pub fn is_none(&self) -> bool {
        *self == ControlComponent::None
    }
}

/// Individually addressable style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleAttr {
    Font,
    Size,
    Bold,
    Italic,
    Underline,
    Strikeout,
    Color,
    Highlight,
    TextDecoration,
}

/// Style attributes a control hands down to the text it renders
pub const CONTROL_STYLE_ATTRS: &[StyleAttr] = &[
    StyleAttr::Bold,
    StyleAttr::Color,
    StyleAttr::Highlight,
    StyleAttr::Font,
    StyleAttr::Size,
    StyleAttr::Italic,
    StyleAttr::Underline,
    StyleAttr::Strikeout,
];

/// Every style attribute an element can carry
pub const ELEMENT_STYLE_ATTRS: &[StyleAttr] = &[
    StyleAttr::Bold,
    StyleAttr::Color,
    StyleAttr::Highlight,
    StyleAttr::Font,
    StyleAttr::Size,
    StyleAttr::Italic,
    StyleAttr::Underline,
    StyleAttr::Strikeout,
    StyleAttr::TextDecoration,
];

/// Per-element formatting. Unset fields fall back to the renderer default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikeout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
}

impl ElementStyle {
    pub fn is_empty(&self) -> bool {
        ELEMENT_STYLE_ATTRS.iter().all(|&attr| !self.has(attr))
    }

    pub fn has(&self, attr: StyleAttr) -> bool {
        match attr {
            StyleAttr::Font => self.font.is_some(),
            StyleAttr::Size => self.size.is_some(),
            StyleAttr::Bold => self.bold.is_some(),
            StyleAttr::Italic => self.italic.is_some(),
            StyleAttr::Underline => self.underline.is_some(),
            StyleAttr::Strikeout => self.strikeout.is_some(),
            StyleAttr::Color => self.color.is_some(),
            StyleAttr::Highlight => self.highlight.is_some(),
            StyleAttr::TextDecoration => self.text_decoration.is_some(),
        }
    }

    fn copy_attr(&mut self, from: &ElementStyle, attr: StyleAttr) {
        match attr {
            StyleAttr::Font => self.font = from.font.clone(),
            StyleAttr::Size => self.size = from.size,
            StyleAttr::Bold => self.bold = from.bold,
            StyleAttr::Italic => self.italic = from.italic,
            StyleAttr::Underline => self.underline = from.underline,
            StyleAttr::Strikeout => self.strikeout = from.strikeout,
            StyleAttr::Color => self.color = from.color.clone(),
            StyleAttr::Highlight => self.highlight = from.highlight.clone(),
            StyleAttr::TextDecoration => self.text_decoration = from.text_decoration.clone(),
        }
    }

    fn clear_attr(&mut self, attr: StyleAttr) {
        match attr {
            StyleAttr::Font => self.font = None,
            StyleAttr::Size => self.size = None,
            StyleAttr::Bold => self.bold = None,
            StyleAttr::Italic => self.italic = None,
            StyleAttr::Underline => self.underline = None,
            StyleAttr::Strikeout => self.strikeout = None,
            StyleAttr::Color => self.color = None,
            StyleAttr::Highlight => self.highlight = None,
            StyleAttr::TextDecoration => self.text_decoration = None,
        }
    }

    /// Keep only the listed attributes
    pub fn pick(&self, attrs: &[StyleAttr]) -> ElementStyle {
        let mut style = ElementStyle::default();
        for &attr in attrs {
            style.copy_attr(self, attr);
        }
        style
    }

    /// Drop the listed attributes
    pub fn omit(&self, attrs: &[StyleAttr]) -> ElementStyle {
        let mut style = self.clone();
        for &attr in attrs {
            style.clear_attr(attr);
        }
        style
    }

    /// Attributes set on `top` replace ours
    pub fn overlay(&self, top: &ElementStyle) -> ElementStyle {
        let mut style = self.clone();
        for &attr in ELEMENT_STYLE_ATTRS {
            if top.has(attr) {
                style.copy_attr(top, attr);
            }
        }
        style
    }
}

/// A selectable option of a select control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueSet {
    pub code: String,
    #[serde(default)]
    pub value: String,
}

impl ValueSet {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        ValueSet {
            code: code.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectExclusiveOptions {
    /// Whether text may be written into the value run directly
    pub input_able: bool,
}

/// Descriptor shared by every element of one control run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Control {
    /// Selected option codes, comma joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub value_sets: Vec<ValueSet>,
    pub is_multi_select: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_select_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_exclusive_options: Option<SelectExclusiveOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postfix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_text: Option<String>,
    pub disabled: bool,
}

impl Control {
    pub fn select(value_sets: Vec<ValueSet>) -> Self {
        Control {
            value_sets,
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn multi_select(mut self, delimiter: Option<&str>) -> Self {
        self.is_multi_select = true;
        self.multi_select_delimiter = delimiter.map(str::to_string);
        self
    }

    pub fn input_able(&self) -> bool {
        self.select_exclusive_options
            .is_some_and(|options| options.input_able)
    }
}

/// Smallest addressable unit of a document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_id: Option<String>,
    #[serde(skip_serializing_if = "ControlComponent::is_none")]
    pub control_component: ControlComponent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<Control>,
    #[serde(skip_serializing_if = "ElementStyle::is_empty")]
    pub style: ElementStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

impl Element {
    pub fn text(value: impl Into<String>) -> Self {
        Element {
            value: value.into(),
            ..Default::default()
        }
    }

    /// A line break, the anchor every document starts with
    pub fn line_break() -> Self {
        Self::text("\n")
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Absent type counts as text
    pub fn is_text_like(&self) -> bool {
        self.element_type.is_none_or(ElementType::is_text_like)
    }

    pub fn belongs_to(&self, control_id: &str) -> bool {
        self.control_id.as_deref() == Some(control_id)
    }

    /// Fields set on `top` win; everything else comes from `self`
    pub fn overlay(&self, top: &Element) -> Element {
        Element {
            value: top.value.clone(),
            element_type: top.element_type.or(self.element_type),
            control_id: top.control_id.clone().or_else(|| self.control_id.clone()),
            control_component: if top.control_component.is_none() {
                self.control_component
            } else {
                top.control_component
            },
            control: top.control.clone().or_else(|| self.control.clone()),
            style: self.style.overlay(&top.style),
            title_id: top.title_id.clone().or_else(|| self.title_id.clone()),
            list_id: top.list_id.clone().or_else(|| self.list_id.clone()),
        }
    }

    /// Control identity plus the listed style attributes, nothing else
    pub fn pick_identity(&self, attrs: &[StyleAttr]) -> Element {
        Element {
            control_id: self.control_id.clone(),
            control: self.control.clone(),
            style: self.style.pick(attrs),
            ..Default::default()
        }
    }

    /// Only the listed style attributes
    pub fn pick_style(&self, attrs: &[StyleAttr]) -> Element {
        Element {
            style: self.style.pick(attrs),
            ..Default::default()
        }
    }

    /// Everything except the listed style attributes
    pub fn omit_style(&self, attrs: &[StyleAttr]) -> Element {
        Element {
            style: self.style.omit(attrs),
            ..self.clone()
        }
    }

    /// Everything except the element type
    pub fn without_type(&self) -> Element {
        Element {
            element_type: None,
            ..self.clone()
        }
    }
}

/// Caret (collapsed) or selection over an element list.
///
/// Index `i` addresses the gap right after `elements[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

impl Range {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Range {
            start_index,
            end_index,
        }
    }

    pub fn collapsed(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Split text into indivisible display units (extended grapheme clusters)
pub fn split_text(text: &str) -> Vec<String> {
    text.graphemes(true).map(str::to_string).collect()
}

/// Concatenated values of a list of elements
pub fn elements_to_text(elements: &[Element]) -> String {
    elements.iter().map(|e| e.value.as_str()).collect()
}

fn context_anchor(elements: &[Element], anchor_index: usize) -> Option<&Element> {
    let anchor = elements.get(anchor_index)?;
    if anchor.list_id.is_none()
        && anchor.value == "\n"
        && let Some(next) = elements.get(anchor_index + 1)
        && next.value != "\n"
    {
        return Some(next);
    }
    Some(anchor)
}

/// Make a freshly synthesized element share the structural context
/// (title, list) of the element it is inserted after.
pub fn format_element_context(elements: &[Element], element: &mut Element, anchor_index: usize) {
    let Some(anchor) = context_anchor(elements, anchor_index) else {
        return;
    };
    element.title_id = anchor.title_id.clone();
    element.list_id = anchor.list_id.clone();
}
