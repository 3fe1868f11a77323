use legend_common::Element;
use serde::Serialize;

/// What kind of interactive control an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Button,
    Link,
    TextField,
    Checkbox,
    Radio,
    Select,
    Image,
}

const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "password", "email", "search", "tel", "url", "number", "date", "datetime-local",
    "month", "week", "time", "color", "file",
];

impl ControlKind {
    /// Classify an element, `None` when it is not a control.
    ///
    /// Hidden elements are never controls.
    pub fn classify(elem: &Element) -> Option<ControlKind> {
        if elem.is_hidden() {
            return None;
        }

        let by_tag = match elem.tag.as_str() {
            "button" => Some(ControlKind::Button),
            "a" if elem.get_attr("href").is_some() => Some(ControlKind::Link),
            "textarea" => Some(ControlKind::TextField),
            "select" => Some(ControlKind::Select),
            "img" => Some(ControlKind::Image),
            "input" => classify_input(&elem.input_type()),
            _ => None,
        };

        by_tag
            .or_else(|| classify_role(elem))
            .or_else(|| {
                elem.attr_is("contenteditable", "true")
                    .then_some(ControlKind::TextField)
            })
    }

    /// Buttons and links show their own caption.
    pub fn has_caption(self) -> bool {
        matches!(self, ControlKind::Button | ControlKind::Link)
    }

    /// Form fields that can be named and labelled.
    pub fn is_form_field(self) -> bool {
        matches!(
            self,
            ControlKind::TextField | ControlKind::Checkbox | ControlKind::Radio | ControlKind::Select
        )
    }
}

fn classify_input(input_type: &str) -> Option<ControlKind> {
    match input_type {
        "submit" | "button" | "reset" | "image" => Some(ControlKind::Button),
        "checkbox" => Some(ControlKind::Checkbox),
        "radio" => Some(ControlKind::Radio),
        t if TEXT_INPUT_TYPES.contains(&t) => Some(ControlKind::TextField),
        _ => None,
    }
}

fn classify_role(elem: &Element) -> Option<ControlKind> {
    match elem.get_attr("role")?.to_lowercase().as_str() {
        "button" => Some(ControlKind::Button),
        "link" => Some(ControlKind::Link),
        "textbox" | "searchbox" => Some(ControlKind::TextField),
        "checkbox" | "switch" => Some(ControlKind::Checkbox),
        "radio" => Some(ControlKind::Radio),
        "listbox" | "combobox" => Some(ControlKind::Select),
        _ => None,
    }
}
