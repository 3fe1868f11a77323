use crate::pattern::{PatternError, SearchPattern};
use std::fmt;

/// Separator between path nodes and the target node.
pub const PATH_SEPARATOR: char = '>';

/// A parsed locator: `path node > path node > target`.
///
/// The path anchors the search somewhere in the page text, the target
/// identifies the control itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    source: String,
    path: Vec<SearchPattern>,
    target: SearchPattern,
}

impl Locator {
    pub fn parse(locator: &str) -> Result<Self, PatternError> {
        Self::parse_with(locator, true)
    }

    pub fn parse_with(locator: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        if locator.trim().is_empty() {
            return Err(PatternError::EmptyLocator);
        }

        let mut patterns = split_nodes(locator)
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let node = node.trim();
                if node.is_empty() {
                    Err(PatternError::EmptyNode {
                        locator: locator.to_string(),
                        index,
                    })
                } else {
                    SearchPattern::compile_with(node, case_sensitive)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let target = patterns.pop().ok_or(PatternError::EmptyLocator)?;
        Ok(Self {
            source: locator.to_string(),
            path: patterns,
            target,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &[SearchPattern] {
        &self.path
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// The innermost path node, the one closest to the target.
    pub fn path_pattern(&self) -> Option<&SearchPattern> {
        self.path.last()
    }

    pub fn target(&self) -> &SearchPattern {
        &self.target
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on unescaped separators, keeping escapes intact for the pattern compiler.
fn split_nodes(locator: &str) -> Vec<String> {
    let mut nodes = Vec::new();
    let mut current = String::new();
    let mut chars = locator.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            PATH_SEPARATOR => nodes.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    nodes.push(current);

    nodes
}
