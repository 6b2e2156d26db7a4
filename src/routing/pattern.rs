//! Reference pattern parsing and matching.
//!
//! # Responsibilities
//! - Split a `/`-delimited reference into its literal prefix and captures
//! - Match the literal prefix segment by segment
//! - Assign captures positionally, the last one absorbing any overflow
//!
//! # Design Decisions
//! - The first `?` token switches the rest of the pattern to capture mode,
//!   so a pattern is stored as literals followed by capture names
//! - Literal comparison is exact after trimming; request segments are
//!   already lowercase, literals are lowercased at parse time
//! - No specificity ranking here, the table order decides

use std::collections::BTreeMap;

/// Marks a pattern token as a capture.
pub const CAPTURE_SIGIL: char = '?';

/// Parameter name → captured value.
pub type ParamsMap = BTreeMap<String, String>;

/// A parsed reference pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePattern {
    literals: Vec<String>,
    captures: Vec<String>,
}

/// Successful match of one pattern against the request segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// The matched literal prefix, joined with `/`.
    pub reference: String,
    /// Captured parameters.
    pub captures: ParamsMap,
}

impl ReferencePattern {
    /// Parse a `/`-delimited reference. Surrounding slashes are ignored,
    /// the same way request paths are split.
    pub fn parse(source: &str) -> Self {
        let mut literals = Vec::new();
        let mut captures = Vec::new();

        let source = source.trim().trim_matches('/');
        if source.is_empty() {
            return Self { literals, captures };
        }

        for token in source.split('/') {
            let token = token.trim();
            if captures.is_empty() && !token.starts_with(CAPTURE_SIGIL) {
                literals.push(token.to_lowercase());
                continue;
            }
            // Capture mode is sticky: a later token without the sigil is
            // still a capture name.
            let name = token.strip_prefix(CAPTURE_SIGIL).unwrap_or(token);
            captures.push(name.trim().to_string());
        }

        Self { literals, captures }
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Capture names in pattern order. May contain duplicates and, for
    /// unvalidated patterns, empty names.
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    pub fn has_capture(&self) -> bool {
        !self.captures.is_empty()
    }

    /// Match against request segments.
    ///
    /// Returns `None` on the first literal mismatch, or when a pattern
    /// without captures differs in length.
    pub fn match_segments(&self, segments: &[String]) -> Option<PatternMatch> {
        for (position, literal) in self.literals.iter().enumerate() {
            if segments.get(position)?.trim() != literal {
                return None;
            }
        }

        if !self.has_capture() {
            return (segments.len() == self.literals.len()).then(|| PatternMatch {
                reference: self.literals.join("/"),
                captures: ParamsMap::new(),
            });
        }

        let mut captures = ParamsMap::new();
        let offset = self.literals.len();
        for (index, name) in self.captures.iter().enumerate() {
            let value = segments
                .get(offset + index)
                .map(|segment| segment.trim().to_string())
                .unwrap_or_default();
            // Duplicate names: last write wins.
            captures.insert(name.clone(), value);
        }

        let consumed = offset + self.captures.len();
        if segments.len() > consumed {
            if let Some(last) = self.captures.last() {
                let value = captures.entry(last.clone()).or_default();
                for segment in &segments[consumed..] {
                    value.push('/');
                    value.push_str(segment);
                }
            }
        }

        Some(PatternMatch {
            reference: self.literals.join("/"),
            captures,
        })
    }
}
