//! Control resolution for text-driven UI tests.
//!
//! Test steps name controls the way a person reads the page ("the field after
//! User Name", "the Submit button"). This crate turns such a locator plus a
//! page snapshot into exactly one control, or explains why it cannot.
//!
//! ```text
//! PageSnapshot -> PageIndex -> Matcher (per FoundType) -> WeightedControlList -> Resolution
//! ```

pub mod config;
pub mod control;
pub mod found_type;
pub mod index;
pub mod locator;
pub mod matcher;
pub mod pattern;
pub mod provider;
pub mod resolution;
pub mod span;
pub mod weighted;

pub use config::{ResolverConfig, TieBreak};
pub use control::ControlKind;
pub use found_type::FoundType;
pub use index::{IndexedControl, PageIndex};
pub use locator::Locator;
pub use pattern::{PatternError, SearchPattern};
pub use provider::{DocumentProvider, ProviderError, Session, StaticProvider};
pub use resolution::{
    Resolution, ResolutionEngine, ResolutionError, ResolvedControl, TargetRequirement,
};
pub use span::FindSpot;
pub use weighted::{Decision, RankedControl, WeightedControlList, WeightedEntry};

pub use legend_common::protocol;
