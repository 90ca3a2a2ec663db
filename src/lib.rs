//! # docflat
//!
//! Assembles a browsable documentation site from the markdown scattered
//! across a source repository. Documents are fetched (GitHub API or a local
//! checkout), their paths flattened, their links rewritten for the new
//! layout, and a navigation tree synthesized; the result is a docs tree
//! plus `mkdocs.yml`, handed to MkDocs to build.
//!
//! # Architecture
//!
//! ```text
//! source  →  Documents  →  flatten + rewrite  →  docs/       (one file per document)
//!                                             →  nav          (ordered, titled)
//!                                             →  mkdocs.yml   →  mkdocs build  →  site/
//! ```
//!
//! The stages are plain functions of their inputs. Everything that touches
//! the network or spawns a process sits behind a trait
//! ([`source::DocumentSource`], [`mkdocs::SiteBuilder`]) so the pipeline is
//! tested end to end without either.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`assemble`] | Pipeline orchestration: fetch, write, navigate, configure, build |
//! | [`source`] | Document retrieval from the GitHub API or a local checkout |
//! | [`flatten`] | Strips the docs root from repository paths |
//! | [`rewrite`] | Ordered link rewriting rules for the flattened layout |
//! | [`title`] | Navigation labels from `SCREAMING_SNAKE` filenames |
//! | [`nav`] | Navigation tree synthesis with pinned home and reference pages |
//! | [`reference`] | gomarkdoc SGML to markdown conversion for the API reference |
//! | [`mkdocs`] | `mkdocs.yml` emission and the external site build |
//! | [`config`] | `docflat.toml` loading, merging with stock defaults, validation |
//! | [`types`] | Shared types passed between stages (`Documents`, `NavEntry`) |
//! | [`output`] | CLI output formatting for pipeline progress and navigation |
//!
//! # Design Decisions
//!
//! ## Links Are Rewritten Textually
//!
//! Markdown is never parsed. A single pattern finds `[text](target)`
//! occurrences and each target goes through [`rewrite::LinkRule::ORDER`];
//! the first rule that claims it wins. Reference-style links, autolinks and
//! HTML anchors pass through untouched.
//!
//! ## Partial Fetches Still Publish
//!
//! A source that fails halfway keeps what it already delivered, and the
//! site is built from that. Only a fetch that yields nothing at all stops
//! the pipeline, and it stops before the old docs tree is deleted.

pub mod assemble;
pub mod config;
pub mod flatten;
pub mod mkdocs;
pub mod nav;
pub mod output;
pub mod reference;
pub mod rewrite;
pub mod source;
pub mod title;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
