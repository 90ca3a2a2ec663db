//! Markdown link rewriting for the flattened site.
//!
//! Documents are written to a single output tree with the docs root
//! stripped (see [`crate::flatten`]), so links written against the
//! repository layout need fixing up. Every `[text](target)` occurrence is
//! matched once and its target is handed to an ordered list of
//! [`LinkRule`]s. The first rule that matches decides the new target; the
//! link text is never touched.
//!
//! ## Rules
//!
//! | # | Rule | Example |
//! |---|------|---------|
//! | 1 | [`LinkRule::ExternalUrl`] | `https://aws.amazon.com` → unchanged |
//! | 2 | [`LinkRule::NonMarkdownFile`] | `.runvoy/config.yml` → `<blob>/.runvoy/config.yml` |
//! | 3 | [`LinkRule::DocsRootMarkdown`] | `docs/CLI` → `CLI.md` |
//! | 4 | [`LinkRule::BareDocName`] | `CONTRIBUTING` → `CONTRIBUTING.md` |
//! | 5 | [`LinkRule::RelativeMarkdown`] | `./README.md` → `<blob>/README.md` |
//! | 6 | [`LinkRule::RelativeNonMarkdown`] | `./LICENSE` → `<blob>/LICENSE` |
//!
//! `<blob>` is the repository's web view on the configured branch, e.g.
//! `https://github.com/runvoy/runvoy/blob/main`.
//!
//! Anything no rule claims is left as written. That includes directory
//! links such as `docs/guide/` and paths with a `..` segment. A
//! `#fragment` on a target is carried across a rewrite.

use crate::config::{LayoutConfig, RepoConfig};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

/// `[text](target)`; text may not contain `]`, target may not contain `)`.
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// An all-caps document name such as `CLI` or `CODE_OF_CONDUCT`.
static BARE_DOC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z_]+$").unwrap());

/// Uppercase/underscore file names without an extension (`LICENSE`, `VERSION`).
static BARE_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_]+$").unwrap());

const MARKDOWN_EXT: &str = "md";

/// Link target rewriting rules, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// Absolute URLs are left alone.
    ExternalUrl,
    /// Files with a non-markdown extension point at the repository web view.
    NonMarkdownFile,
    /// `docs/X.md` and `docs/X` become `X.md`.
    DocsRootMarkdown,
    /// `CLI` becomes `CLI.md`.
    BareDocName,
    /// `./X.md` lives outside the docs tree and points at the web view.
    RelativeMarkdown,
    /// `./LICENSE`, `./notes.1` point at the web view.
    RelativeNonMarkdown,
}

impl LinkRule {
    /// All rules, highest precedence first.
    pub const ORDER: [LinkRule; 6] = [
        LinkRule::ExternalUrl,
        LinkRule::NonMarkdownFile,
        LinkRule::DocsRootMarkdown,
        LinkRule::BareDocName,
        LinkRule::RelativeMarkdown,
        LinkRule::RelativeNonMarkdown,
    ];

    /// Apply this rule to a target; `None` means the rule does not match.
    pub fn apply(self, target: &str, rewriter: &LinkRewriter) -> Option<String> {
        let (path, fragment) = split_fragment(target);
        match self {
            LinkRule::ExternalUrl => is_absolute_url(target).then(|| target.to_string()),
            LinkRule::NonMarkdownFile => {
                if is_absolute_url(target) || has_parent_segment(path) {
                    return None;
                }
                let ext = extension(path)?;
                if ext.eq_ignore_ascii_case(MARKDOWN_EXT) || !is_letters(ext) {
                    return None;
                }
                // `./x` drops its prefix, `.hidden/x` keeps the dot.
                let repo_path = path.strip_prefix("./").unwrap_or(path);
                Some(format!("{}/{repo_path}{fragment}", rewriter.blob_base))
            }
            LinkRule::DocsRootMarkdown => {
                let rest = path.strip_prefix(&rewriter.docs_root)?;
                if rest.is_empty() || rest.ends_with('/') || has_parent_segment(rest) {
                    return None;
                }
                if has_markdown_ext(rest) {
                    Some(format!("{rest}{fragment}"))
                } else if extension(rest).is_none() {
                    Some(format!("{rest}.{MARKDOWN_EXT}{fragment}"))
                } else {
                    None
                }
            }
            LinkRule::BareDocName => {
                if target.starts_with('#')
                    || target.contains("://")
                    || has_markdown_ext(path)
                    || !BARE_DOC_NAME.is_match(path)
                {
                    return None;
                }
                Some(format!("{path}.{MARKDOWN_EXT}{fragment}"))
            }
            LinkRule::RelativeMarkdown => {
                let rest = path.strip_prefix("./")?;
                let stem = rest.strip_suffix(".md")?;
                if stem.is_empty() || has_parent_segment(rest) {
                    return None;
                }
                Some(format!("{}/{rest}{fragment}", rewriter.blob_base))
            }
            LinkRule::RelativeNonMarkdown => {
                let rest = path.strip_prefix("./")?;
                if has_parent_segment(rest) {
                    return None;
                }
                let matches = match extension_any(rest) {
                    Some(ext) => !ext.starts_with(MARKDOWN_EXT),
                    None => BARE_FILE_NAME.is_match(rest),
                };
                matches.then(|| format!("{}/{rest}{fragment}", rewriter.blob_base))
            }
        }
    }
}

impl fmt::Display for LinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkRule::ExternalUrl => "external-url",
            LinkRule::NonMarkdownFile => "non-markdown-file",
            LinkRule::DocsRootMarkdown => "docs-root-markdown",
            LinkRule::BareDocName => "bare-doc-name",
            LinkRule::RelativeMarkdown => "relative-markdown",
            LinkRule::RelativeNonMarkdown => "relative-non-markdown",
        };
        f.write_str(name)
    }
}

/// Rewrites link targets in markdown text.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    blob_base: String,
    docs_root: String,
}

impl LinkRewriter {
    pub fn new(repo: &RepoConfig, layout: &LayoutConfig) -> Self {
        Self::with_blob_base(repo.blob_base(), &layout.docs_root)
    }

    /// Build a rewriter from an explicit web-view base URL.
    pub fn with_blob_base(blob_base: impl Into<String>, docs_root: &str) -> Self {
        let blob_base = blob_base.into();
        Self {
            blob_base: blob_base.trim_end_matches('/').to_string(),
            docs_root: format!("{}/", docs_root.trim_matches('/')),
        }
    }

    pub fn blob_base(&self) -> &str {
        &self.blob_base
    }

    /// Rewrite every link in `text`. `origin_path` is the document's
    /// repository path and is only used for diagnostics.
    pub fn rewrite(&self, text: &str, origin_path: &str) -> String {
        LINK_PATTERN
            .replace_all(text, |caps: &Captures| {
                let link_text = &caps[1];
                let target = &caps[2];
                match self.rewrite_target(target) {
                    Some((rule, new_target)) if new_target != target => {
                        tracing::debug!(
                            origin = origin_path,
                            %rule,
                            from = target,
                            to = %new_target,
                            "Rewrote link"
                        );
                        format!("[{link_text}]({new_target})")
                    }
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Run a single target through the rules.
    ///
    /// Returns the first matching rule and its output, or `None` if the
    /// target is left as written.
    pub fn rewrite_target(&self, target: &str) -> Option<(LinkRule, String)> {
        LinkRule::ORDER
            .iter()
            .find_map(|rule| rule.apply(target, self).map(|t| (*rule, t)))
    }
}

/// `http://`, `https://`, any other `scheme://`, or `mailto:`.
fn is_absolute_url(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("mailto:")
        || target.contains("://")
}

/// Split `path#fragment`; the fragment keeps its `#`.
fn split_fragment(target: &str) -> (&str, &str) {
    match target.find('#') {
        Some(i) => target.split_at(i),
        None => (target, ""),
    }
}

/// Text after the last dot, provided something precedes the dot and the
/// text is a plain run of ASCII letters (`yml`, `json`).
fn extension(path: &str) -> Option<&str> {
    extension_any(path).filter(|ext| is_letters(ext))
}

/// Text after the last dot of the last path segment, whatever it contains.
fn extension_any(path: &str) -> Option<&str> {
    let dot = path.rfind('.')?;
    if dot == 0 || path[dot..].contains('/') {
        return None;
    }
    Some(&path[dot + 1..])
}

/// A `..` component; such targets depend on the linking document's
/// directory and are left as written.
fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|part| part == "..")
}

fn has_markdown_ext(path: &str) -> bool {
    extension(path).is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXT))
}

fn is_letters(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}
