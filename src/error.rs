use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the memwrap library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// No source files found under the scanned directory.
    #[error(
        "No .{extension} files found in '{path}'. \
        Make sure you are running from the directory containing your source files."
    )]
    NoFiles {
        /// Directory that was scanned
        path: PathBuf,
        /// Source extension that was looked for
        extension: String,
    },

    /// Invalid UTF-8 encountered in file.
    #[error("Invalid UTF-8 encoding in file '{path}'. File may be binary or use unsupported encoding.")]
    InvalidUtf8 {
        /// Path to file with encoding issues
        path: PathBuf,
    },

    /// A substitution rule carries a malformed pattern.
    #[error("Invalid substitution pattern '{pattern}': {message}")]
    InvalidRule {
        /// The offending pattern text
        pattern: String,
        /// Error message from the regex compiler
        message: String,
    },

    /// Failure reading the operator's confirmation answer.
    #[error("Failed to read confirmation: {message}")]
    Prompt {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid UTF-8 error.
    #[must_use]
    pub fn invalid_utf8(path: impl Into<PathBuf>) -> Self {
        Self::InvalidUtf8 { path: path.into() }
    }

    /// Creates a no files error.
    #[must_use]
    pub fn no_files(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::NoFiles {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Creates an invalid rule error.
    #[must_use]
    pub fn invalid_rule(pattern: impl Into<String>, source: &regex::Error) -> Self {
        Self::InvalidRule {
            pattern: pattern.into(),
            message: source.to_string(),
        }
    }

    /// Creates a prompt error.
    #[must_use]
    pub fn prompt(source: std::io::Error) -> Self {
        Self::Prompt {
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this is a no-files error.
    #[must_use]
    pub const fn is_no_files(&self) -> bool {
        matches!(self, Self::NoFiles { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.c", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.c"));
    }

    #[test]
    fn test_no_files_error_mentions_extension() {
        let err = Error::no_files("/tmp/empty", "c");
        assert!(err.is_no_files());
        assert!(err.to_string().contains("No .c files"));
        assert!(err.to_string().contains("/tmp/empty"));
    }

    #[test]
    fn test_invalid_rule_error() {
        let bad = regex::Regex::new("(").unwrap_err();
        let err = Error::invalid_rule("(", &bad);
        assert!(err.to_string().contains("Invalid substitution pattern"));
    }

    #[test]
    fn test_error_clone() {
        let err = Error::config("test");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
