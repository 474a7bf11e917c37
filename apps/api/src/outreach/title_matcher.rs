//! Precise job-title matching.
//!
//! A title only counts when it starts the text or follows a list delimiter (`,`, `;`, `&`,
//! `and`), and is followed by a delimiter, whitespace or the end of the text. "President"
//! therefore matches "President, EMEA" but never "Vice President".

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compiled matcher over a set of target titles. Matches nothing when built from an
/// empty list.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    pattern: Option<Regex>,
}

impl TitleMatcher {
    pub fn new<S: AsRef<str>>(titles: &[S]) -> Self {
        let mut alternatives: Vec<String> = titles
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        // Longest first so "VP of Engineering" wins over "VP" at the same position.
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()));
        alternatives.dedup();

        let source = format!(
            r"(?:^|[,;&]|\band\b)\s*(?:{})(?:[\s,;&]|$)",
            alternatives.join("|")
        );

        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Self {
                pattern: Some(regex),
            },
            Err(e) => {
                warn!("Title matcher could not be compiled, title bonus disabled: {e}");
                Self { pattern: None }
            }
        }
    }

    /// True when `text` contains one of the target titles at a title boundary.
    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Some(regex) => regex.is_match(text.trim()),
            None => false,
        }
    }
}
