//! Source file discovery.
//!
//! Candidate files are the source-extension files directly under the scan
//! root plus those in each immediate, non-hidden subdirectory. Declaration
//! files and anything nested deeper are never candidates.

use crate::config::Config;
use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// A source file selected for processing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path on disk, as produced by the walk
    pub path: PathBuf,

    /// Path relative to the scan root, used for display and ordering
    pub relative_path: String,
}

/// Discovers source files one directory level deep.
pub(crate) struct Discoverer {
    root_dir: PathBuf,
    source_extension: String,
    declaration_extension: String,
}

impl Discoverer {
    /// Creates a new discoverer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            source_extension: config.source_extension.clone(),
            declaration_extension: config.declaration_extension.clone(),
        }
    }

    /// Walks the scan root and returns all candidate files, sorted by
    /// relative path so run reports are reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFiles`] if nothing matched.
    pub(crate) fn discover(&self) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();

        debug!("Scanning {} one level deep", self.root_dir.display());

        // Depth 1 is the root's own entries, depth 2 the immediate
        // subdirectories' files. The hidden filter drops dot-named files and
        // directories, matching the original discovery rules.
        let walker = WalkBuilder::new(&self.root_dir)
            .max_depth(Some(2))
            .hidden(true)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .follow_links(false)
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }

                    let path = entry.path();
                    if !self.is_candidate(path) {
                        continue;
                    }

                    let relative_path = pathdiff::diff_paths(path, &self.root_dir)
                        .unwrap_or_else(|| path.to_path_buf())
                        .to_string_lossy()
                        .to_string();

                    trace!("Discovered {relative_path}");
                    files.push(SourceFile {
                        path: path.to_path_buf(),
                        relative_path,
                    });
                }
                Err(e) => {
                    warn!("Walk error: {e}");
                }
            }
        }

        if files.is_empty() {
            return Err(Error::no_files(&self.root_dir, &self.source_extension));
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        debug!("Discovered {} source files", files.len());
        Ok(files)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == self.source_extension => true,
            Some(ext) if ext == self.declaration_extension => {
                trace!("Skipping declaration file {}", path.display());
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn discover(root: &Path) -> Result<Vec<SourceFile>> {
        let config = Config::builder().root_dir(root).build().unwrap();
        Discoverer::new(&config).discover()
    }

    #[test]
    fn test_finds_top_level_and_subdir_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("main.c").write_str("int main;").unwrap();
        temp.child("util/helpers.c").write_str("int h;").unwrap();
        temp.child("util/helpers.h").write_str("int h;").unwrap();

        let files = discover(temp.path()).unwrap();

        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(files.len(), 2);
        assert!(paths.iter().any(|p| p.ends_with("main.c")));
        assert!(paths.iter().any(|p| p.ends_with("helpers.c")));
    }

    #[test]
    fn test_declaration_files_excluded() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("defs.h").write_str("int x;").unwrap();
        temp.child("main.c").write_str("int main;").unwrap();

        let files = discover(temp.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].relative_path.ends_with("main.c"));
    }

    #[test]
    fn test_no_recursion_beyond_one_level() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("top.c").write_str("int t;").unwrap();
        temp.child("sub/one.c").write_str("int o;").unwrap();
        temp.child("sub/deeper/two.c").write_str("int d;").unwrap();

        let files = discover(temp.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(!files.iter().any(|f| f.relative_path.contains("deeper")));
    }

    #[test]
    fn test_hidden_directories_excluded() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("main.c").write_str("int m;").unwrap();
        temp.child(".git/hook.c").write_str("int g;").unwrap();
        temp.child(".hidden.c").write_str("int h;").unwrap();

        let files = discover(temp.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].relative_path.ends_with("main.c"));
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("readme.md").write_str("nothing here").unwrap();

        let result = discover(temp.path());

        assert!(matches!(result, Err(Error::NoFiles { .. })));
    }

    #[test]
    fn test_results_sorted_by_relative_path() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("zed.c").write_str("int z;").unwrap();
        temp.child("alpha.c").write_str("int a;").unwrap();
        temp.child("mid/beta.c").write_str("int b;").unwrap();

        let files = discover(temp.path()).unwrap();

        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        let mut sorted = paths.clone();
        sorted.sort_unstable();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_custom_extensions() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("mod.cc").write_str("int m;").unwrap();
        temp.child("mod.hh").write_str("int m;").unwrap();

        let config = Config::builder()
            .root_dir(temp.path())
            .source_extension("cc")
            .declaration_extension("hh")
            .build()
            .unwrap();
        let files = Discoverer::new(&config).discover().unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].relative_path.ends_with("mod.cc"));
    }
}
