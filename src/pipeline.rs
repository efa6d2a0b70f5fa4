//! Run orchestration.
//!
//! Ties discovery, rewriting and review together: lists the affected files,
//! gates the run behind an explicit confirmation, processes each file with a
//! backup-then-overwrite write sequence, and prints the run summary.

use crate::{
    config::Config,
    discover::{Discoverer, SourceFile},
    error::{Error, Result},
    review::{ReviewEntry, ReviewScanner},
    rewrite::CallRewriter,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const SUMMARY_DIVIDER_WIDTH: usize = 60;

/// Statistics collected during a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Candidate files found by discovery
    pub files_discovered: usize,

    /// Files read and rewritten (successfully or as no-ops)
    pub files_processed: usize,

    /// Files whose content changed
    pub files_modified: usize,

    /// Backup files written
    pub backups_created: usize,

    /// Review entries accumulated across all files
    pub review_entries: usize,

    /// Files skipped because of read or write failures
    pub io_failures: usize,

    /// True if the operator declined the confirmation prompt
    pub aborted: bool,
}

/// Outcome of processing a single file, for reporting.
struct FileOutcome {
    modified: bool,
    fired_labels: Vec<String>,
    review: Vec<ReviewEntry>,
}

/// Main orchestrator for a rewrite run.
pub struct Pipeline {
    config: Config,
    rewriter: CallRewriter,
    reviewer: ReviewScanner,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            rewriter: CallRewriter::new(),
            reviewer: ReviewScanner::new(),
        })
    }

    /// Executes the complete run, reading confirmation from stdin.
    ///
    /// # Process
    ///
    /// 1. **Discover**: collect and list the candidate files
    /// 2. **Confirm**: require an explicit affirmative answer
    /// 3. **Rewrite**: per file, rewrite, back up, overwrite, review
    /// 4. **Summarize**: print counts and pending manual reviews
    ///
    /// # Errors
    ///
    /// Returns an error if no candidate files exist or stdin is unreadable.
    /// A declined confirmation is not an error; it yields stats with
    /// `aborted` set and no side effects.
    pub fn run(self) -> Result<RunStats> {
        self.run_with_input(&mut io::stdin().lock())
    }

    /// Executes the run, reading the confirmation answer from `input`.
    #[instrument(skip(self, input), fields(root_dir = %self.config.root_dir.display()))]
    pub fn run_with_input<R: BufRead>(self, input: &mut R) -> Result<RunStats> {
        let files = Discoverer::new(&self.config).discover()?;

        info!("Discovered {} candidate files", files.len());
        self.print_scan_report(&files);

        if !self.config.assume_yes && !self.confirm(input)? {
            println!("Aborted.");
            return Ok(RunStats {
                files_discovered: files.len(),
                aborted: true,
                ..RunStats::default()
            });
        }

        println!();

        let mut stats = RunStats {
            files_discovered: files.len(),
            ..RunStats::default()
        };

        for file in &files {
            self.process_file(file, &mut stats);
            println!();
        }

        self.print_summary(&stats);

        info!(
            "Run complete: {} processed, {} modified, {} pending review",
            stats.files_processed, stats.files_modified, stats.review_entries
        );

        Ok(stats)
    }

    /// Prints the discovery report and the sorted file list.
    fn print_scan_report(&self, files: &[SourceFile]) {
        let src = &self.config.source_extension;

        println!("Scanning directory: {}", self.config.root_dir.display());
        println!("Looking for .{src} files...\n");

        let (top_level, by_subdir) = group_by_subdirectory(files);

        println!("Found {top_level} .{src} files in the scan root");
        println!("Found {} subdirectories", self.count_subdirectories());
        for (subdir, count) in &by_subdir {
            println!("  {subdir}/: {count} .{src} files");
        }
        println!();

        println!("Total: {} .{src} files to process", files.len());
        println!(
            "(declaration files with the .{} extension will NOT be modified)\n",
            self.config.declaration_extension
        );

        println!("Files to process:");
        for file in files {
            println!("  - {}", file.relative_path);
        }
        println!();
    }

    /// Counts immediate non-hidden subdirectories of the scan root.
    ///
    /// Presentation only; enumeration failures just yield zero.
    fn count_subdirectories(&self) -> usize {
        fs::read_dir(&self.config.root_dir)
            .map(|entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.file_type().is_ok_and(|ft| ft.is_dir()))
                    .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Prompts the operator and reads one answer line.
    fn confirm<R: BufRead>(&self, input: &mut R) -> Result<bool> {
        print!("Proceed with replacements? (yes/no): ");
        io::stdout().flush().ok();

        let mut answer = String::new();
        input.read_line(&mut answer).map_err(Error::prompt)?;

        Ok(parse_confirmation(&answer))
    }

    /// Processes one file: read, rewrite, write back with backup, review.
    ///
    /// IO failures are downgraded to a console notice plus a warning; the
    /// file is left untouched and the batch continues.
    fn process_file(&self, file: &SourceFile, stats: &mut RunStats) {
        println!("Processing: {}", file.relative_path);

        let original = match fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                let err = if e.kind() == io::ErrorKind::InvalidData {
                    Error::invalid_utf8(&file.path)
                } else {
                    Error::io(&file.path, e)
                };
                warn!("Failed to read {}: {err}", file.relative_path);
                println!("  ! Skipped: {err}");
                stats.io_failures += 1;
                return;
            }
        };

        match self.rewrite_file(file, &original) {
            Ok(outcome) => {
                stats.files_processed += 1;

                if outcome.modified {
                    stats.files_modified += 1;

                    if self.config.dry_run {
                        println!("  ~ Would modify (dry run)");
                    } else {
                        stats.backups_created += 1;
                        println!(
                            "  ✓ Modified (backup: {}.{})",
                            file.relative_path, self.config.backup_suffix
                        );
                    }
                    for label in &outcome.fired_labels {
                        println!("    - {label}");
                    }
                } else {
                    println!("  - No changes needed");
                }

                if !outcome.review.is_empty() {
                    println!(
                        "  ⚠ Found {} malloc() call(s) needing manual review:",
                        outcome.review.len()
                    );
                    for entry in &outcome.review {
                        println!(
                            "    Line {}: {}",
                            entry.line,
                            entry.display_text(self.config.review_display_width)
                        );
                    }
                    stats.review_entries += outcome.review.len();
                }
            }
            Err(e) => {
                warn!("Failed to write {}: {e}", file.relative_path);
                println!("  ! Write failed, file left unchanged: {e}");
                stats.io_failures += 1;
            }
        }
    }

    /// Rewrites one file's content and persists the result if it changed.
    fn rewrite_file(&self, file: &SourceFile, original: &str) -> Result<FileOutcome> {
        let outcome = self.rewriter.rewrite(original);

        for change in outcome.line_changes() {
            if let Some(line) = change.line {
                debug!("{}: line {line}: {}", file.relative_path, change.label);
            }
        }

        if outcome.modified && !self.config.dry_run {
            let backup = append_suffix(&file.path, &self.config.backup_suffix);
            self.write_rewritten(&file.path, &backup, original, &outcome.content)?;
        }

        let review = self.reviewer.scan(&outcome.content);

        Ok(FileOutcome {
            modified: outcome.modified,
            fired_labels: outcome
                .fired_labels()
                .into_iter()
                .map(String::from)
                .collect(),
            review,
        })
    }

    /// Durably writes the pre-run content to the backup path, then replaces
    /// the original through a temp-file rename.
    ///
    /// The backup is flushed before the overwrite begins, so a failure at any
    /// point leaves the original either untouched or fully replaced.
    fn write_rewritten(
        &self,
        path: &Path,
        backup: &Path,
        original: &str,
        rewritten: &str,
    ) -> Result<()> {
        let mut backup_file = fs::File::create(backup).map_err(|e| Error::io(backup, e))?;
        backup_file
            .write_all(original.as_bytes())
            .map_err(|e| Error::io(backup, e))?;
        backup_file.sync_all().map_err(|e| Error::io(backup, e))?;
        drop(backup_file);

        let temp_path = append_suffix(path, "tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
        temp_file
            .write_all(rewritten.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

        debug!("Wrote {} (backup at {})", path.display(), backup.display());
        Ok(())
    }

    /// Prints the end-of-run summary.
    fn print_summary(&self, stats: &RunStats) {
        let src = &self.config.source_extension;

        println!("{}", "=".repeat(SUMMARY_DIVIDER_WIDTH));
        println!("Summary:");
        println!("  Processed {} .{src} files", stats.files_processed);

        if self.config.dry_run {
            println!("  No files were written (dry run)");
        } else {
            println!(
                "  Backup files created with .{} extension",
                self.config.backup_suffix
            );
        }
        println!(
            "  Declaration files (.{}) were NOT modified",
            self.config.declaration_extension
        );

        if stats.io_failures > 0 {
            println!(
                "\n  ! {} file(s) skipped because of IO errors",
                stats.io_failures
            );
        }

        if stats.review_entries > 0 {
            println!(
                "\n  ⚠ WARNING: {} malloc() call(s) need manual review!",
                stats.review_entries
            );
            println!("  These need to be converted to SAFE_MALLOC() with proper type info");
            println!("\n  Example conversions:");
            println!("    ptr = malloc(size)  -->  ptr = safe_malloc(size, __FILE__, __LINE__)");
            println!("    OR");
            println!("    ptr = malloc(n * sizeof(type))  -->  SAFE_MALLOC(ptr, type, n)");
        }
    }
}

/// Returns true for an affirmative confirmation answer.
///
/// Accepts `yes` and `y` in any case, after trimming whitespace. Anything
/// else declines.
#[must_use]
pub fn parse_confirmation(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

/// Appends `.suffix` to the file's full name, keeping the original extension.
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Splits the discovered files into root-level count and per-subdirectory
/// counts, keyed by the first path component.
fn group_by_subdirectory(files: &[SourceFile]) -> (usize, BTreeMap<String, usize>) {
    let mut top_level = 0;
    let mut by_subdir = BTreeMap::new();

    for file in files {
        match file.relative_path.split_once(std::path::MAIN_SEPARATOR) {
            Some((subdir, _)) => {
                *by_subdir.entry(subdir.to_string()).or_insert(0) += 1;
            }
            None => top_level += 1,
        }
    }

    (top_level, by_subdir)
}
