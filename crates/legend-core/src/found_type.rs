use serde::{Deserialize, Serialize};
use std::fmt;

/// How a candidate control was found.
///
/// Variants are declared in priority order. [`FoundType::weight`] is the one
/// place that says how much a locator kind is trusted; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundType {
    ById,
    ByName,
    ByLabel,
    ByLabelElement,
    ByLabelTextBefore,
    ByLabelTextAfter,
    ByAttribute,
    ByText,
}

impl FoundType {
    /// All found-types, most specific first.
    pub const ALL: [FoundType; 8] = [
        FoundType::ById,
        FoundType::ByName,
        FoundType::ByLabel,
        FoundType::ByLabelElement,
        FoundType::ByLabelTextBefore,
        FoundType::ByLabelTextAfter,
        FoundType::ByAttribute,
        FoundType::ByText,
    ];

    pub const fn weight(self) -> u32 {
        match self {
            FoundType::ById => 10,
            FoundType::ByName => 20,
            FoundType::ByLabel => 30,
            FoundType::ByLabelElement => 40,
            FoundType::ByLabelTextBefore => 50,
            FoundType::ByLabelTextAfter => 60,
            FoundType::ByAttribute => 70,
            FoundType::ByText => 80,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            FoundType::ById => "by_id",
            FoundType::ByName => "by_name",
            FoundType::ByLabel => "by_label",
            FoundType::ByLabelElement => "by_label_element",
            FoundType::ByLabelTextBefore => "by_label_text_before",
            FoundType::ByLabelTextAfter => "by_label_text_after",
            FoundType::ByAttribute => "by_attribute",
            FoundType::ByText => "by_text",
        }
    }
}

impl fmt::Display for FoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
