//! Shared types passed between pipeline stages.
//!
//! Documents flow one way: a [`DocumentSource`](crate::source::DocumentSource)
//! fills [`Documents`], the assembler turns each into a [`RewrittenDocument`],
//! and the navigation builder produces [`NavEntry`] values that end up in
//! `mkdocs.yml`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fetched markdown, keyed by origin path (slash-separated, repository-relative).
///
/// A `BTreeMap` keeps iteration order stable so the output tree and the
/// progress log come out the same on every run.
pub type Documents = BTreeMap<String, String>;

/// A document after flattening and link rewriting, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenDocument {
    pub origin_path: String,
    /// Path inside the output tree, e.g. `CLI.md`.
    pub destination_path: String,
    pub text: String,
}

/// One entry of the site navigation.
///
/// MkDocs reads `nav` as an ordered list of single-key mappings, so each
/// variant serializes as `{label: target}` or `{label: [children...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEntry {
    /// A page inside the output tree.
    Page { label: String, path: String },
    /// An absolute link to somewhere else.
    External { label: String, url: String },
    /// A nested group of entries.
    Section {
        label: String,
        children: Vec<NavEntry>,
    },
}

impl NavEntry {
    pub fn page(label: impl Into<String>, path: impl Into<String>) -> Self {
        NavEntry::Page {
            label: label.into(),
            path: path.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NavEntry::Page { label, .. }
            | NavEntry::External { label, .. }
            | NavEntry::Section { label, .. } => label,
        }
    }

    /// Link target for leaf entries; `None` for sections.
    pub fn target(&self) -> Option<&str> {
        match self {
            NavEntry::Page { path, .. } => Some(path),
            NavEntry::External { url, .. } => Some(url),
            NavEntry::Section { .. } => None,
        }
    }
}

impl Serialize for NavEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            NavEntry::Page { label, path } => map.serialize_entry(label, path)?,
            NavEntry::External { label, url } => map.serialize_entry(label, url)?,
            NavEntry::Section { label, children } => map.serialize_entry(label, children)?,
        }
        map.end()
    }
}
