//! Local checkout source.

use super::{DocumentSource, PathFilter, SourceError};
use crate::types::Documents;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Reads documents from a directory on disk, e.g. a git checkout.
pub struct LocalSource {
    root: PathBuf,
    filter: PathFilter,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>, filter: PathFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    /// Repository-style path: relative to the root, `/`-separated.
    fn repo_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == ".git"
}

impl DocumentSource for LocalSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch(&self, sink: &mut Documents) -> Result<(), SourceError> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_git_dir(e));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = self.repo_path(entry.path()) else {
                continue;
            };
            if !self.filter.accepts(&path) {
                continue;
            }
            let text = fs::read_to_string(entry.path())?;
            tracing::info!(path = %path, "Read document");
            sink.insert(path, text);
        }
        Ok(())
    }

    fn version(&self) -> Result<Option<String>, SourceError> {
        let path = self.root.join("VERSION");
        if !path.exists() {
            return Ok(None);
        }
        let version = fs::read_to_string(path)?.trim().to_string();
        Ok(Some(version).filter(|v| !v.is_empty()))
    }
}
