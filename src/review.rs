//! Advisory scan for calls that cannot be rewritten mechanically.
//!
//! Lowercase `malloc(` needs type and size information injected at the call
//! site, so it is never rewritten; every remaining occurrence is recorded for
//! a human to convert.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static MALLOC_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmalloc\s*\(").expect("built-in pattern compiles"));

/// One call site left for manual conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// 1-based line number of the occurrence
    pub line: usize,

    /// Trimmed text of the containing line, untruncated
    pub text: String,
}

impl ReviewEntry {
    /// Returns the entry text bounded to `width` characters for display.
    #[must_use]
    pub fn display_text(&self, width: usize) -> String {
        self.text.chars().take(width).collect()
    }
}

/// Locates remaining raw allocation calls in rewritten content.
#[derive(Debug, Clone)]
pub struct ReviewScanner {
    pattern: Regex,
}

impl ReviewScanner {
    /// Creates a scanner for the raw allocation call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern: MALLOC_CALL.clone(),
        }
    }

    /// Scans content and returns one entry per occurrence, in order.
    ///
    /// Never mutates anything; a line with several occurrences yields one
    /// entry per occurrence, all carrying the same line text.
    #[must_use]
    pub fn scan(&self, content: &str) -> Vec<ReviewEntry> {
        let mut entries = Vec::new();

        for (idx, line) in content.split('\n').enumerate() {
            for _ in self.pattern.find_iter(line) {
                entries.push(ReviewEntry {
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }

        entries
    }
}

impl Default for ReviewScanner {
    fn default() -> Self {
        Self::new()
    }
}
