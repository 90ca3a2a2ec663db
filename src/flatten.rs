//! Repository path → output path mapping.
//!
//! Documentation in the source repository lives partly at the root
//! (`README.md`, `CONTRIBUTING.md`) and partly under a docs directory
//! (`docs/CLI.md`). The generated site puts both at the same level by
//! dropping the docs root prefix:
//!
//! ```text
//! README.md            → README.md
//! docs/CLI.md          → CLI.md
//! docs/guide/SETUP.md  → guide/SETUP.md
//! ```

/// Strips the configured docs root from repository paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattener {
    docs_root: String,
}

impl Flattener {
    /// Create a flattener for `docs_root` (`"docs"` and `"docs/"` are equivalent).
    pub fn new(docs_root: &str) -> Self {
        let trimmed = docs_root.trim_matches('/');
        Self {
            docs_root: format!("{trimmed}/"),
        }
    }

    /// The normalized prefix, always ending in a single `/`.
    pub fn docs_root(&self) -> &str {
        &self.docs_root
    }

    /// Map an origin path to its destination path.
    ///
    /// Strips exactly one leading docs root segment; other paths pass through.
    pub fn flatten(&self, origin_path: &str) -> String {
        origin_path
            .strip_prefix(&self.docs_root)
            .unwrap_or(origin_path)
            .to_string()
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new("docs/")
    }
}
