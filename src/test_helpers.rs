//! Shared test doubles for the docflat test suite.
//!
//! Sources and builders that stand in for GitHub and MkDocs so pipeline
//! tests run offline against a [`tempfile::TempDir`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = StaticSource::new([("docs/CLI.md", "# CLI")]);
//! let builder = RecordingBuilder::new();
//! let outcome = Assembler::new(SiteConfig::default(), tmp.path())
//!     .run(&source, &builder)?;
//! assert_eq!(builder.calls(), vec![tmp.path().to_path_buf()]);
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::mkdocs::{BuildError, SiteBuilder};
use crate::source::{DocumentSource, SourceError};
use crate::types::Documents;

fn to_documents<'a>(docs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Documents {
    docs.into_iter()
        .map(|(path, text)| (path.to_string(), text.to_string()))
        .collect()
}

// =========================================================================
// Sources
// =========================================================================

/// Serves a fixed set of documents.
pub struct StaticSource {
    docs: Documents,
    version: Option<String>,
}

impl StaticSource {
    pub fn new<'a>(docs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            docs: to_documents(docs),
            version: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<(&str, &str)>::new())
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn documents(&self) -> Documents {
        self.docs.clone()
    }
}

impl DocumentSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    fn fetch(&self, sink: &mut Documents) -> Result<(), SourceError> {
        sink.extend(self.docs.clone());
        Ok(())
    }

    fn version(&self) -> Result<Option<String>, SourceError> {
        Ok(self.version.clone())
    }
}

/// Delivers some documents, then fails like a dropped connection.
pub struct FailingSource {
    partial: Documents,
}

impl FailingSource {
    pub fn new<'a>(partial: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            partial: to_documents(partial),
        }
    }
}

impl DocumentSource for FailingSource {
    fn describe(&self) -> String {
        "failing".to_string()
    }

    fn fetch(&self, sink: &mut Documents) -> Result<(), SourceError> {
        sink.extend(self.partial.clone());
        Err(SourceError::Transport("connection reset".to_string()))
    }

    fn version(&self) -> Result<Option<String>, SourceError> {
        Err(SourceError::Transport("connection reset".to_string()))
    }
}

// =========================================================================
// Builders
// =========================================================================

/// Records every project directory it is asked to build.
pub struct RecordingBuilder {
    calls: RefCell<Vec<PathBuf>>,
    failure: Option<String>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failure: None,
        }
    }

    /// A builder whose every build fails with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failure: Some(stderr.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl SiteBuilder for RecordingBuilder {
    fn build(&self, project_dir: &Path) -> Result<(), BuildError> {
        self.calls.borrow_mut().push(project_dir.to_path_buf());
        match &self.failure {
            Some(stderr) => Err(BuildError::Failed {
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}
