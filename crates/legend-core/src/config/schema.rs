use crate::found_type::FoundType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Fixed per resolver; patterns are compiled with it.
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Strategies to run. Always executed in priority order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<FoundType>,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            case_sensitive: default_case_sensitive(),
            tie_break: TieBreak::default(),
            strategies: default_strategies(),
            max_suggestions: default_max_suggestions(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

/// What to do when distinct controls share the best rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Report the tie as ambiguous.
    #[default]
    Ambiguous,
    /// Take the control that comes first in the document.
    DocumentOrder,
}

fn default_case_sensitive() -> bool {
    true
}

fn default_strategies() -> Vec<FoundType> {
    FoundType::ALL.to_vec()
}

fn default_max_suggestions() -> usize {
    3
}

fn default_suggestion_threshold() -> f64 {
    0.6
}
