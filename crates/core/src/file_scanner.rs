//! Build file discovery

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner with configurable filters
pub struct FileScanner {
    root: PathBuf,
    file_names: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl FileScanner {
    /// Create a new file scanner rooted at the given path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_names: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Only keep files with one of these exact names (e.g. `build.gradle.kts`)
    #[must_use]
    pub fn with_file_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.file_names = names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Add glob patterns to exclude
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            let compiled = glob::Pattern::new(pattern.as_ref()).map_err(|e| {
                Error::config(format!("Invalid exclude pattern `{}`: {e}", pattern.as_ref()))
            })?;
            self.exclude_patterns.push(compiled);
        }
        Ok(self)
    }

    /// Scan and return matching files, sorted by path
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::file_not_found(&self.root));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            if !self.file_names.is_empty() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !self.file_names.iter().any(|n| n == name) {
                    continue;
                }
            }

            if self.should_exclude(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        tracing::debug!(root = %self.root.display(), found = files.len(), "Scan complete");
        Ok(files)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude_patterns
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.') && n != "." && n != "..")
}

/// Find module build files under `root` using the `[scan]` settings
pub fn scan_build_files(root: &Path, settings: &ScanConfig) -> Result<Vec<PathBuf>> {
    FileScanner::new(root)
        .with_file_names(settings.file_names.as_slice())
        .exclude(settings.exclude.as_slice())?
        .scan()
}
