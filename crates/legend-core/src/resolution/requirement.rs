use crate::control::ControlKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of control a test step requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRequirement {
    /// Any control (default)
    #[default]
    Any,

    /// Buttons, links, images, checkboxes and radios
    Clickable,

    /// Text fields: input, textarea, contenteditable
    Typeable,

    /// Checkboxes and radios
    Checkable,

    /// Select boxes and listboxes
    Selectable,
}

impl TargetRequirement {
    pub fn accepts(self, kind: ControlKind) -> bool {
        match self {
            Self::Any => true,
            Self::Clickable => matches!(
                kind,
                ControlKind::Button
                    | ControlKind::Link
                    | ControlKind::Image
                    | ControlKind::Checkbox
                    | ControlKind::Radio
            ),
            Self::Typeable => kind == ControlKind::TextField,
            Self::Checkable => matches!(kind, ControlKind::Checkbox | ControlKind::Radio),
            Self::Selectable => kind == ControlKind::Select,
        }
    }
}

impl FromStr for TargetRequirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "clickable" | "click" => Ok(Self::Clickable),
            "typeable" | "type" => Ok(Self::Typeable),
            "checkable" | "check" => Ok(Self::Checkable),
            "selectable" | "select" => Ok(Self::Selectable),
            other => Err(format!("Unknown requirement: {}", other)),
        }
    }
}

impl fmt::Display for TargetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Clickable => "clickable",
            Self::Typeable => "typeable",
            Self::Checkable => "checkable",
            Self::Selectable => "selectable",
        };
        f.write_str(name)
    }
}
