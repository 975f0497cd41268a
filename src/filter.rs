//! Regex matching over hunk text for `/` search and the `G` global filter.

use crate::diff::Hunk;
use error_set::error_set;
use regex::Regex;
use tracing::{debug, warn};

error_set! {
    /// Errors from compiling a user-supplied pattern
    FilterError := {
        #[display("Invalid regex pattern '{pattern}': {message}")]
        InvalidPattern { pattern: String, message: String },
    }
}

/// A compiled hunk filter.
///
/// Matching is case-sensitive unless the pattern carries an inline `(?i)`.
#[derive(Debug, Clone)]
pub struct Filter {
    regex: Regex,
}

impl Filter {
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] if `pattern` does not compile.
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        Regex::new(pattern)
            .map(|regex| Filter { regex })
            .map_err(|e| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether any raw line of the hunk, header included, matches.
    pub fn matches(&self, hunk: &Hunk) -> bool {
        hunk.lines.iter().any(|line| self.regex.is_match(line))
    }

    /// Matching hunks in their original order.
    pub fn apply(&self, hunks: &[Hunk]) -> Vec<Hunk> {
        let kept: Vec<Hunk> = hunks.iter().filter(|h| self.matches(h)).cloned().collect();
        debug!(
            pattern = self.pattern(),
            before = hunks.len(),
            after = kept.len(),
            "filtered hunks"
        );
        kept
    }
}

/// Match a single hunk against a pattern, failing closed on a bad pattern.
pub fn matches(hunk: &Hunk, pattern: &str) -> bool {
    match Filter::new(pattern) {
        Ok(filter) => filter.matches(hunk),
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}

/// Keep the hunks matching `pattern`; empty when nothing matches or the
/// pattern is invalid.
pub fn filter_hunks(hunks: &[Hunk], pattern: &str) -> Vec<Hunk> {
    match Filter::new(pattern) {
        Ok(filter) => filter.apply(hunks),
        Err(e) => {
            warn!("{e}");
            Vec::new()
        }
    }
}

/// Next matching hunk after `ix`, wrapping around to `0..=ix`.
pub fn search(hunks: &[Hunk], ix: usize, filter: &Filter) -> Option<usize> {
    let after = ix.saturating_add(1).min(hunks.len());
    (after..hunks.len())
        .chain(0..after)
        .find(|&i| filter.matches(&hunks[i]))
}
