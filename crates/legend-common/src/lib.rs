pub mod normalizer;
pub mod protocol;

pub use normalizer::normalize_whitespace;
pub use protocol::{Element, ElementState, Node, PageSnapshot};
