//! Document retrieval.
//!
//! The [`DocumentSource`] trait is the seam between the pipeline and
//! wherever the markdown lives. Two implementations exist:
//!
//! - [`GitHubSource`]: the GitHub REST API (git trees + blobs), used for
//!   published builds.
//! - [`LocalSource`]: a local checkout, walked from disk. Handy for
//!   previewing docs before they are pushed.
//!
//! Sources write into a caller-owned [`Documents`] map as they go. When a
//! source fails halfway, everything collected before the failure is still
//! in the map and the caller decides whether to continue with it.

mod github;
mod local;

pub use github::GitHubSource;
pub use local::LocalSource;

use crate::types::Documents;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Could not decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl From<ureq::Error> for SourceError {
    fn from(e: ureq::Error) -> Self {
        SourceError::Transport(e.to_string())
    }
}

/// Something that can produce the repository's markdown documents.
pub trait DocumentSource {
    /// Human-readable origin, e.g. `runvoy/runvoy@main`.
    fn describe(&self) -> String;

    /// Insert every markdown document into `sink`, keyed by repository path.
    fn fetch(&self, sink: &mut Documents) -> Result<(), SourceError>;

    /// Contents of the repository's `VERSION` file, if it has one.
    fn version(&self) -> Result<Option<String>, SourceError> {
        Ok(None)
    }
}

/// Decides which repository paths are collected.
///
/// A path is kept when it is a markdown file and none of its components
/// starts with an excluded pattern (`LICENSE`, `.github`, ...).
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    exclude: Vec<String>,
}

impl PathFilter {
    pub fn new(exclude: &[String]) -> Self {
        Self {
            exclude: exclude.to_vec(),
        }
    }

    pub fn accepts(&self, path: &str) -> bool {
        path.ends_with(".md") && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &str) -> bool {
        path.split('/').any(|part| {
            self.exclude
                .iter()
                .any(|pattern| part.starts_with(pattern.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;

    fn default_filter() -> PathFilter {
        PathFilter::new(&FetchConfig::default().exclude)
    }

    #[test]
    fn markdown_files_accepted() {
        let filter = default_filter();
        assert!(filter.accepts("README.md"));
        assert!(filter.accepts("docs/CLI.md"));
        assert!(filter.accepts("cmd/runvoy/README.md"));
    }

    #[test]
    fn non_markdown_rejected() {
        let filter = default_filter();
        assert!(!filter.accepts("go.mod"));
        assert!(!filter.accepts("docs/diagram.png"));
        assert!(!filter.accepts("docs/NOTES.mdx"));
    }

    #[test]
    fn excluded_names_rejected() {
        let filter = default_filter();
        assert!(!filter.accepts("CHANGELOG.md"));
        assert!(!filter.accepts("AGENTS.md"));
        assert!(!filter.accepts("LICENSE.md"));
    }

    #[test]
    fn excluded_directory_components_rejected() {
        let filter = default_filter();
        assert!(!filter.accepts(".github/PULL_REQUEST_TEMPLATE.md"));
        assert!(!filter.accepts("docs/.github/x.md"));
    }

    #[test]
    fn pattern_is_a_prefix_match() {
        let filter = default_filter();
        assert!(!filter.accepts("docs/CHANGELOG_2024.md"));
        assert!(filter.accepts("docs/MY_CHANGELOG.md"));
    }

    #[test]
    fn empty_exclude_list_accepts_all_markdown() {
        let filter = PathFilter::default();
        assert!(filter.accepts("CHANGELOG.md"));
    }
}
