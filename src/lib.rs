//! # memwrap
//!
//! A one-shot utility that normalizes raw C memory-management calls to
//! instrumented "safe wrapper" names.
//!
//! ## Features
//!
//! - One-level directory discovery with deterministic ordering
//! - Ordered, word-boundary substitution rules (`FREE(` → `SAFE_FREE(`,
//!   `MALLOC(` → `SAFE_MALLOC(`, `free(` → `SAFE_FREE(`)
//! - The deallocator's own definition line is never self-rewritten
//! - Sibling `.bak` backups written and flushed before any overwrite
//! - Remaining `malloc(` calls reported for manual conversion
//!
//! ## Quick Start
//!
//! ```no_run
//! use memwrap::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir("./src")
//!     .assume_yes(true)
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Discoverer**: Collects candidate source files one level deep
//! 2. **Rewriter**: Applies the ordered substitution rules
//! 3. **Reviewer**: Records calls that need manual conversion
//! 4. **Pipeline**: Confirms, writes backups, overwrites, summarizes

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod discover;
mod error;
mod pipeline;
mod review;
mod rewrite;

pub use config::{Config, ConfigBuilder};
pub use discover::SourceFile;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunStats, parse_confirmation};
pub use review::{ReviewEntry, ReviewScanner};
pub use rewrite::{
    CallRewriter, ChangeRecord, LABEL_FREE_CALL, LABEL_FREE_MACRO, LABEL_MALLOC_MACRO,
    RewriteOutcome, RewriteRule, RuleScope, is_deallocator_definition,
};

/// Runs the complete rewrite pipeline with the given configuration.
///
/// This is the main entry point for the library. Confirmation is read from
/// stdin unless the configuration assumes an affirmative answer.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - No candidate source files are found
/// - The confirmation answer cannot be read
///
/// # Examples
///
/// ```no_run
/// use memwrap::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .root_dir(".")
///     .build()?;
///
/// run(config)?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<RunStats> {
    Pipeline::new(config)?.run()
}
