//! Wildcard search patterns.
//!
//! A locator node is literal text in which `*` stands for any run of
//! characters (possibly empty) and `?` for exactly one character. A backslash
//! escapes `*`, `?`, `\` and the path separator `>`; any other escape is
//! rejected so typos surface at compile time instead of as silent misses.

use crate::span::FindSpot;
use legend_common::normalize_whitespace;
use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Empty locator")]
    EmptyLocator,

    #[error("Empty node {index} in locator '{locator}'")]
    EmptyNode { locator: String, index: usize },

    #[error("Dangling escape at end of pattern '{pattern}'")]
    DanglingEscape { pattern: String },

    #[error("Invalid escape '\\{escaped}' at position {position} in pattern '{pattern}'")]
    InvalidEscape {
        pattern: String,
        position: usize,
        escaped: char,
    },

    #[error("Failed to compile pattern '{pattern}': {reason}")]
    Compile { pattern: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    AnyRun,
    AnyOne,
}

/// Characters that may follow a backslash.
const ESCAPABLE: &[char] = &['*', '?', '\\', '>'];

/// A compiled locator fragment. Immutable once built.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    original: String,
    case_sensitive: bool,
    /// Set when the pattern has no wildcards and is case-sensitive.
    literal: Option<String>,
    match_all: bool,
    full: Regex,
    search: Regex,
    prefix: Regex,
}

impl SearchPattern {
    /// Compile with the default case-sensitive policy.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        Self::compile_with(pattern, true)
    }

    pub fn compile_with(pattern: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        let normalized = normalize_whitespace(pattern);
        let tokens = tokenize(&normalized)?;

        let match_all = !tokens.is_empty() && tokens.iter().all(|t| *t == Token::AnyRun);
        let literal = match tokens.as_slice() {
            [] if case_sensitive => Some(String::new()),
            [Token::Literal(text)] if case_sensitive => Some(text.clone()),
            _ => None,
        };

        let body = to_regex_body(&tokens);
        let flags = if case_sensitive { "(?s)" } else { "(?si)" };
        let build = |source: String| {
            Regex::new(&source).map_err(|e| PatternError::Compile {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            original: pattern.to_string(),
            case_sensitive,
            literal,
            match_all,
            full: build(format!("{flags}^(?:{body})$"))?,
            search: build(format!("{flags}(?:{body})"))?,
            prefix: build(format!("{flags}^(?:{body})"))?,
        })
    }

    /// The literal as written by the author.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// True for patterns consisting only of `*`.
    pub fn is_match_all(&self) -> bool {
        self.match_all
    }

    /// The whole text satisfies the pattern.
    pub fn matches(&self, text: &str) -> bool {
        match &self.literal {
            Some(lit) => text == lit,
            None => self.full.is_match(text),
        }
    }

    pub fn is_contained_in(&self, text: &str) -> bool {
        match &self.literal {
            Some(lit) => text.contains(lit.as_str()),
            None => self.search.is_match(text),
        }
    }

    pub fn first_occurrence(&self, text: &str) -> Option<FindSpot> {
        match &self.literal {
            Some(lit) => text
                .find(lit.as_str())
                .map(|start| FindSpot::new(start, start + lit.len())),
            None => self
                .search
                .find(text)
                .map(|m| FindSpot::new(m.start(), m.end())),
        }
    }

    /// The occurrence with the greatest start offset.
    pub fn last_occurrence(&self, text: &str) -> Option<FindSpot> {
        if let Some(lit) = &self.literal {
            return text
                .rfind(lit.as_str())
                .map(|start| FindSpot::new(start, start + lit.len()));
        }

        if !self.search.is_match(text) {
            return None;
        }

        let mut starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        starts.push(text.len());
        starts.into_iter().rev().find_map(|start| {
            self.prefix
                .find(&text[start..])
                .map(|m| FindSpot::new(start, start + m.end()))
        })
    }

    /// Characters in front of the last occurrence; the full length if absent.
    pub fn no_of_chars_before_last_occurrence(&self, text: &str) -> usize {
        match self.last_occurrence(text) {
            Some(spot) => char_len(&text[..spot.start]),
            None => char_len(text),
        }
    }

    /// Characters behind the last occurrence; the full length if absent.
    pub fn no_of_chars_after_last_occurrence(&self, text: &str) -> usize {
        match self.last_occurrence(text) {
            Some(spot) => char_len(&text[spot.end..]),
            None => char_len(text),
        }
    }

    /// Characters in front of the first occurrence; the full length if absent.
    pub fn no_of_chars_before_first_occurrence(&self, text: &str) -> usize {
        match self.first_occurrence(text) {
            Some(spot) => char_len(&text[..spot.start]),
            None => char_len(text),
        }
    }
}

impl PartialEq for SearchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original && self.case_sensitive == other.case_sensitive
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn tokenize(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices();

    let flush = |literal: &mut String, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    };

    while let Some((position, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) if ESCAPABLE.contains(&escaped) => literal.push(escaped),
                Some((_, escaped)) => {
                    return Err(PatternError::InvalidEscape {
                        pattern: pattern.to_string(),
                        position,
                        escaped,
                    });
                }
                None => {
                    return Err(PatternError::DanglingEscape {
                        pattern: pattern.to_string(),
                    });
                }
            },
            '*' => {
                flush(&mut literal, &mut tokens);
                // Consecutive stars are one wildcard.
                if tokens.last() != Some(&Token::AnyRun) {
                    tokens.push(Token::AnyRun);
                }
            }
            '?' => {
                flush(&mut literal, &mut tokens);
                tokens.push(Token::AnyOne);
            }
            _ => literal.push(c),
        }
    }
    flush(&mut literal, &mut tokens);

    Ok(tokens)
}

fn to_regex_body(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Token::Literal(text) => regex::escape(text),
            Token::AnyRun => ".*?".to_string(),
            Token::AnyOne => ".".to_string(),
        })
        .collect()
}
