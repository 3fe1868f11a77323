use crate::control::ControlKind;
use crate::found_type::FoundType;
use crate::pattern::PatternError;
use crate::provider::ProviderError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The control a pass settled on, with what justified it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedControl {
    pub id: u32,
    pub tag: String,
    pub kind: ControlKind,
    pub found_type: FoundType,
    pub distance: usize,
    /// Every strategy that found this control, best first.
    pub found_by: Vec<FoundType>,
    pub disabled: bool,
}

impl fmt::Display for ResolvedControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} <{}> {} distance {}",
            self.id, self.tag, self.found_type, self.distance
        )
    }
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Found {
        locator: String,
        control: ResolvedControl,
    },
    NotFound {
        locator: String,
        suggestions: Vec<String>,
    },
    Ambiguous {
        locator: String,
        candidates: Vec<ResolvedControl>,
    },
}

impl Resolution {
    pub fn locator(&self) -> &str {
        match self {
            Resolution::Found { locator, .. }
            | Resolution::NotFound { locator, .. }
            | Resolution::Ambiguous { locator, .. } => locator,
        }
    }

    pub fn control(&self) -> Option<&ResolvedControl> {
        match self {
            Resolution::Found { control, .. } => Some(control),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    /// Turn not-found and ambiguous outcomes into errors.
    pub fn into_control(self) -> Result<ResolvedControl, ResolutionError> {
        match self {
            Resolution::Found { control, .. } => Ok(control),
            Resolution::NotFound {
                locator,
                suggestions,
            } => Err(ResolutionError::NotFound {
                locator,
                suggestions,
            }),
            Resolution::Ambiguous {
                locator,
                candidates,
            } => Err(ResolutionError::Ambiguous {
                locator,
                candidates,
            }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Invalid locator: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("No control matches locator '{locator}'{}", format_suggestions(.suggestions))]
    NotFound {
        locator: String,
        suggestions: Vec<String>,
    },

    #[error(
        "Ambiguous locator '{locator}' matches {} controls: {}",
        .candidates.len(),
        format_candidates(.candidates)
    )]
    Ambiguous {
        locator: String,
        candidates: Vec<ResolvedControl>,
    },

    #[error(
        "Stale page index: built from generation {index_generation}, document is at generation {document_generation}"
    )]
    StaleIndex {
        index_generation: u64,
        document_generation: u64,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {})", suggestions.join(", "))
    }
}

fn format_candidates(candidates: &[ResolvedControl]) -> String {
    candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
