//! API reference conversion.
//!
//! Go API docs are produced by `gomarkdoc` as an SGML-ish dump. This module
//! turns that dump into plain markdown so it can be published as the
//! reference document at the end of the navigation.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Ordered tag substitutions; later patterns see the output of earlier ones.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"<package[^>]*>([^<]+)</package>", "## Package: $1"),
        (r"<func[^>]*>([^<]+)</func>", "### $1"),
        (r"<method[^>]*>([^<]+)</method>", "### $1"),
        (r"<type[^>]*>([^<]+)</type>", "### Type: $1"),
        (r"(?s)<code[^>]*>(.*?)</code>", "```go\n$1\n```"),
        (r#"<a[^>]*href=['"]([^'"]+)['"][^>]*>([^<]+)</a>"#, "[$2]($1)"),
        (r"<p[^>]*>", ""),
        (r"</p>", "\n\n"),
        (r"<ul[^>]*>", ""),
        (r"</ul>", "\n"),
        (r"<ol[^>]*>", ""),
        (r"</ol>", "\n"),
        (r"<li[^>]*>", "- "),
        (r"</li>", "\n"),
        (r"<em[^>]*>([^<]+)</em>", "*$1*"),
        (r"<strong[^>]*>([^<]+)</strong>", "**$1**"),
        (r"<h1[^>]*>([^<]+)</h1>", "# $1"),
        (r"<h2[^>]*>([^<]+)</h2>", "## $1"),
        (r"<h3[^>]*>([^<]+)</h3>", "### $1"),
        (r"<h4[^>]*>([^<]+)</h4>", "#### $1"),
        (r"<[^>]+>", ""),
        (r"\n{3,}", "\n\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Convert a gomarkdoc SGML dump to markdown.
pub fn sgml_to_markdown(sgml: &str) -> String {
    let converted = SUBSTITUTIONS
        .iter()
        .fold(sgml.to_string(), |content, (pattern, replacement)| {
            pattern.replace_all(&content, *replacement).into_owned()
        });
    converted.trim().to_string()
}

/// Read and convert the reference source at `path`.
///
/// Returns `Ok(None)` when the file does not exist, so an unconfigured or
/// not-yet-generated reference simply drops out of the site.
pub fn load_reference(path: &Path) -> Result<Option<String>, ReferenceError> {
    if !path.exists() {
        return Ok(None);
    }
    let sgml = fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(sgml_to_markdown(&sgml)))
}
