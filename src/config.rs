use crate::error::{Error, Result};
use std::path::PathBuf;

const DEFAULT_SOURCE_EXTENSION: &str = "c";
const DEFAULT_DECLARATION_EXTENSION: &str = "h";
const DEFAULT_BACKUP_SUFFIX: &str = "bak";
const DEFAULT_REVIEW_DISPLAY_WIDTH: usize = 80;

/// Configuration for the memwrap pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to scan for source files
    pub root_dir: PathBuf,

    /// Extension of source files eligible for rewriting (without dot)
    pub source_extension: String,

    /// Extension of declaration files, which are never touched (without dot)
    pub declaration_extension: String,

    /// Suffix appended to a file's full name to form its backup path (without dot)
    pub backup_suffix: String,

    /// Maximum characters of a review line shown in reports
    pub review_display_width: usize,

    /// Skip the interactive confirmation prompt
    pub assume_yes: bool,

    /// Dry run mode (no file writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use memwrap::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .assume_yes(true)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - An extension or the backup suffix is empty or carries a leading dot
    /// - Source and declaration extensions collide
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        for (name, value) in [
            ("source_extension", &self.source_extension),
            ("declaration_extension", &self.declaration_extension),
            ("backup_suffix", &self.backup_suffix),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!("{name} must not be empty")));
            }
            if value.starts_with('.') {
                return Err(Error::config(format!(
                    "{name} must not include a leading dot: '{value}'"
                )));
            }
        }

        if self.source_extension == self.declaration_extension {
            return Err(Error::config(format!(
                "source_extension and declaration_extension must differ (both are '{}')",
                self.source_extension
            )));
        }

        if self.review_display_width == 0 {
            return Err(Error::config("review_display_width must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            declaration_extension: DEFAULT_DECLARATION_EXTENSION.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            review_display_width: DEFAULT_REVIEW_DISPLAY_WIDTH,
            assume_yes: false,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    source_extension: Option<String>,
    declaration_extension: Option<String>,
    backup_suffix: Option<String>,
    review_display_width: Option<usize>,
    assume_yes: bool,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to scan.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the source file extension (without dot).
    #[must_use]
    pub fn source_extension(mut self, ext: impl Into<String>) -> Self {
        self.source_extension = Some(ext.into());
        self
    }

    /// Sets the declaration file extension (without dot).
    #[must_use]
    pub fn declaration_extension(mut self, ext: impl Into<String>) -> Self {
        self.declaration_extension = Some(ext.into());
        self
    }

    /// Sets the backup suffix appended to modified files (without dot).
    #[must_use]
    pub fn backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = Some(suffix.into());
        self
    }

    /// Sets the maximum review line width used in reports.
    #[must_use]
    pub fn review_display_width(mut self, width: usize) -> Self {
        self.review_display_width = Some(width);
        self
    }

    /// Skips the interactive confirmation prompt.
    #[must_use]
    pub fn assume_yes(mut self, enabled: bool) -> Self {
        self.assume_yes = enabled;
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, see [`Config::validate`].
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();

        let config = Config {
            root_dir: self.root_dir.unwrap_or(defaults.root_dir),
            source_extension: self.source_extension.unwrap_or(defaults.source_extension),
            declaration_extension: self
                .declaration_extension
                .unwrap_or(defaults.declaration_extension),
            backup_suffix: self.backup_suffix.unwrap_or(defaults.backup_suffix),
            review_display_width: self
                .review_display_width
                .unwrap_or(defaults.review_display_width),
            assume_yes: self.assume_yes,
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}
