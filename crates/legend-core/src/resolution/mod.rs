pub mod engine;
pub mod requirement;
pub mod result;
pub mod suggest;

pub use engine::ResolutionEngine;
pub use requirement::TargetRequirement;
pub use result::{Resolution, ResolutionError, ResolvedControl};
