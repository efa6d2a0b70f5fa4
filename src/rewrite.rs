//! Token-boundary call rewriting.
//!
//! Substitution of raw allocation/deallocation call names with their
//! instrumented safe-wrapper equivalents. Rules are ordered and purely
//! textual: a word-boundary regex stands in for real lexical analysis, so
//! matches inside comments and string literals are rewritten too.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Label reported when an uppercase `FREE(` call is rewritten.
pub const LABEL_FREE_MACRO: &str = "FREE() -> SAFE_FREE()";
/// Label reported when an uppercase `MALLOC(` call is rewritten.
pub const LABEL_MALLOC_MACRO: &str = "MALLOC() -> SAFE_MALLOC()";
/// Label reported when a lowercase `free(` call is rewritten.
pub const LABEL_FREE_CALL: &str = "free() -> SAFE_FREE()";

static FREE_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*void\s+free\s*\(").expect("built-in pattern compiles")
});

static DEFAULT_RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        RewriteRule::new(LABEL_FREE_MACRO, r"\bFREE\s*\(", "SAFE_FREE(", RuleScope::Global)
            .expect("built-in pattern compiles"),
        RewriteRule::new(LABEL_MALLOC_MACRO, r"\bMALLOC\s*\(", "SAFE_MALLOC(", RuleScope::Global)
            .expect("built-in pattern compiles"),
        RewriteRule::new(
            LABEL_FREE_CALL,
            r"\bfree\s*\(",
            "SAFE_FREE(",
            RuleScope::LineLocal {
                exempt: is_deallocator_definition,
            },
        )
        .expect("built-in pattern compiles"),
    ]
});

/// Returns true if the line is the deallocator's own definition signature,
/// i.e. optional leading whitespace, `void`, whitespace, `free`, `(`.
///
/// The check is line-local: a signature split across lines is not detected.
#[must_use]
pub fn is_deallocator_definition(line: &str) -> bool {
    FREE_DEFINITION.is_match(line)
}

/// Where a substitution rule applies within a file.
#[derive(Debug, Clone, Copy)]
pub enum RuleScope {
    /// One pass over the whole file content.
    Global,

    /// Line by line; lines for which the predicate returns true are skipped.
    LineLocal {
        /// Returns true for lines the rule must leave untouched.
        exempt: fn(&str) -> bool,
    },
}

/// A single ordered substitution: a word-boundary matcher plus its
/// replacement text.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    label: String,
    pattern: Regex,
    replacement: String,
    scope: RuleScope,
}

impl RewriteRule {
    /// Creates a rule from a regex pattern and a literal replacement.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn new(
        label: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
        scope: RuleScope,
    ) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|e| Error::invalid_rule(pattern, &e))?;

        Ok(Self {
            label: label.into(),
            pattern: compiled,
            replacement: replacement.into(),
            scope,
        })
    }

    /// Returns the rule's reporting label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    fn apply_to_str(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// A record of one rule firing, used only for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Label of the rule that fired
    pub label: String,

    /// Line touched, for line-local rules (1-based)
    pub line: Option<usize>,
}

/// Result of rewriting one file's content.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The transformed content
    pub content: String,

    /// Which rules fired, in application order
    pub changes: Vec<ChangeRecord>,

    /// True if the content differs from the input
    pub modified: bool,
}

impl RewriteOutcome {
    /// Distinct labels of whole-content rules that fired, in rule order.
    ///
    /// Line-local firings are excluded; their per-line records are available
    /// through [`RewriteOutcome::line_changes`].
    #[must_use]
    pub fn fired_labels(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        for change in &self.changes {
            if change.line.is_none() && !labels.contains(&change.label.as_str()) {
                labels.push(change.label.as_str());
            }
        }
        labels
    }

    /// Records of line-local rule firings, with their 1-based line numbers.
    pub fn line_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.changes.iter().filter(|c| c.line.is_some())
    }
}

/// Applies an ordered rule list to file content.
///
/// The default rule set rewrites `FREE(` and `MALLOC(` everywhere and
/// `free(` on every line that is not the deallocator's own definition.
#[derive(Debug, Clone)]
pub struct CallRewriter {
    rules: Vec<RewriteRule>,
}

impl CallRewriter {
    /// Creates a rewriter with the default safe-wrapper rule set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Creates a rewriter from a custom ordered rule list.
    ///
    /// Rules run in the order given; later rules see the output of earlier
    /// ones.
    #[must_use]
    pub fn with_rules(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Rewrites the given content, recording which rules fired.
    ///
    /// Content is split and re-joined on `\n`, so everything outside the
    /// replacements themselves is preserved byte for byte. A rule whose
    /// pattern spans a newline (via `\s`) collapses it into the canonical
    /// `NAME(` call form.
    #[must_use]
    pub fn rewrite(&self, content: &str) -> RewriteOutcome {
        let mut current = content.to_string();
        let mut changes = Vec::new();

        for rule in &self.rules {
            match rule.scope {
                RuleScope::Global => {
                    let rewritten = rule.apply_to_str(&current);
                    if rewritten != current {
                        changes.push(ChangeRecord {
                            label: rule.label.clone(),
                            line: None,
                        });
                        current = rewritten;
                    }
                }
                RuleScope::LineLocal { exempt } => {
                    let mut lines = Vec::new();
                    for (idx, line) in current.split('\n').enumerate() {
                        if exempt(line) {
                            lines.push(line.to_string());
                            continue;
                        }

                        let rewritten = rule.apply_to_str(line);
                        if rewritten != line {
                            changes.push(ChangeRecord {
                                label: rule.label.clone(),
                                line: Some(idx + 1),
                            });
                        }
                        lines.push(rewritten);
                    }
                    current = lines.join("\n");
                }
            }
        }

        let modified = current != content;

        RewriteOutcome {
            content: current,
            changes,
            modified,
        }
    }
}

impl Default for CallRewriter {
    fn default() -> Self {
        Self::new()
    }
}
