//! GitHub REST API source.
//!
//! Collects every markdown blob on a branch with one tree listing:
//!
//! ```text
//! GET /repos/{repo}/git/refs/heads/{branch}   → head commit sha
//! GET /repos/{repo}/git/trees/{sha}?recursive=1
//! GET /repos/{repo}/git/blobs/{sha}           → base64 content, per file
//! ```
//!
//! Single files (the home document, `VERSION`) go through the contents
//! API and its `download_url`.

use super::{DocumentSource, PathFilter, SourceError};
use crate::config::RepoConfig;
use crate::types::Documents;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

const ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitTree {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitBlob {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    download_url: Option<String>,
}

/// Reads documents from a GitHub repository.
pub struct GitHubSource {
    agent: Agent,
    repo: RepoConfig,
    token: Option<String>,
    filter: PathFilter,
    home: Option<String>,
}

impl GitHubSource {
    pub fn new(repo: RepoConfig, token: Option<String>, filter: PathFilter) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            repo,
            token: token.filter(|t| !t.is_empty()),
            filter,
            home: None,
        }
    }

    /// Also fetch `path` through the contents API when the tree walk did
    /// not yield it.
    pub fn with_home(mut self, path: impl Into<String>) -> Self {
        self.home = Some(path.into());
        self
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.repo.api_repo_url(), endpoint)
    }

    fn get(&self, url: &str) -> Result<ureq::Body, SourceError> {
        let mut request = self.agent.get(url).header("Accept", ACCEPT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.call()?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_string());
            return Err(SourceError::Http {
                status,
                url: url.to_string(),
                body: error_body,
            });
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        Ok(self.get(url)?.read_json()?)
    }

    fn head_sha(&self) -> Result<String, SourceError> {
        let url = self.api_url(&format!("git/refs/heads/{}", self.repo.branch));
        let git_ref: GitRef = self.get_json(&url)?;
        Ok(git_ref.object.sha)
    }

    /// Fetch a single file's text via the contents API.
    ///
    /// Returns `Ok(None)` if the file has no download URL (directories,
    /// submodules).
    fn fetch_file(&self, path: &str) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}?ref={}",
            self.api_url(&format!("contents/{path}")),
            self.repo.branch
        );
        let entry: ContentEntry = self.get_json(&url)?;
        match entry.download_url {
            Some(download_url) => Ok(Some(self.get(&download_url)?.read_to_string()?)),
            None => Ok(None),
        }
    }
}

impl DocumentSource for GitHubSource {
    fn describe(&self) -> String {
        format!("{}@{}", self.repo.name, self.repo.branch)
    }

    fn fetch(&self, sink: &mut Documents) -> Result<(), SourceError> {
        let sha = self.head_sha()?;
        debug!(sha = %sha, "Resolved branch head");

        let tree: GitTree = self.get_json(&self.api_url(&format!("git/trees/{sha}?recursive=1")))?;
        if tree.truncated {
            warn!(repo = %self.repo.name, "Tree listing was truncated; some documents may be missing");
        }

        for entry in tree.tree {
            if entry.kind != "blob" || !self.filter.accepts(&entry.path) {
                continue;
            }
            let blob: GitBlob = self.get_json(&self.api_url(&format!("git/blobs/{}", entry.sha)))?;
            let text = decode_blob(&entry.path, &blob.content)?;
            info!(path = %entry.path, "Fetched document");
            sink.insert(entry.path, text);
        }

        if let Some(home) = &self.home
            && !sink.contains_key(home)
        {
            match self.fetch_file(home) {
                Ok(Some(text)) if !text.is_empty() => {
                    info!(path = %home, "Fetched home document");
                    sink.insert(home.clone(), text);
                }
                Ok(_) => {}
                Err(e) => warn!(path = %home, error = %e, "Could not fetch home document"),
            }
        }
        Ok(())
    }

    fn version(&self) -> Result<Option<String>, SourceError> {
        let version = self.fetch_file("VERSION")?;
        Ok(version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

/// Decode a git blob's base64 payload (GitHub wraps it at 60 columns).
fn decode_blob(path: &str, content: &str) -> Result<String, SourceError> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| SourceError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| SourceError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> GitHubSource {
        GitHubSource::new(RepoConfig::default(), None, PathFilter::default())
    }

    #[test]
    fn decode_blob_handles_wrapped_base64() {
        // "# Runvoy\n\nSee [CLI](docs/CLI).\n" wrapped across lines
        let encoded = STANDARD.encode("# Runvoy\n\nSee [CLI](docs/CLI).\n");
        let (a, b) = encoded.split_at(10);
        let wrapped = format!("{a}\n{b}\n");
        assert_eq!(
            decode_blob("README.md", &wrapped).unwrap(),
            "# Runvoy\n\nSee [CLI](docs/CLI).\n"
        );
    }

    #[test]
    fn decode_blob_rejects_garbage() {
        let err = decode_blob("README.md", "!!!not base64!!!").unwrap_err();
        assert!(matches!(err, SourceError::Decode { ref path, .. } if path == "README.md"));
    }

    #[test]
    fn decode_blob_rejects_invalid_utf8() {
        let encoded = STANDARD.encode([0xffu8, 0xfe, 0xfd]);
        assert!(matches!(
            decode_blob("bin.md", &encoded),
            Err(SourceError::Decode { .. })
        ));
    }

    #[test]
    fn api_urls_use_repo() {
        let s = source();
        assert_eq!(
            s.api_url("git/refs/heads/main"),
            "https://api.github.com/repos/runvoy/runvoy/git/refs/heads/main"
        );
        assert_eq!(s.describe(), "runvoy/runvoy@main");
    }

    #[test]
    fn empty_token_is_ignored() {
        let s = GitHubSource::new(RepoConfig::default(), Some(String::new()), PathFilter::default());
        assert!(s.token.is_none());
    }

    #[test]
    fn tree_response_parses() {
        let json = r#"{
            "sha": "abc",
            "tree": [
                {"path": "docs", "type": "tree", "sha": "t1", "mode": "040000"},
                {"path": "docs/CLI.md", "type": "blob", "sha": "b1", "size": 10}
            ],
            "truncated": false
        }"#;
        let tree: GitTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.tree.len(), 2);
        assert_eq!(tree.tree[1].kind, "blob");
        assert!(!tree.truncated);
    }

    #[test]
    fn content_entry_without_download_url() {
        let entry: ContentEntry = serde_json::from_str(r#"{"download_url": null}"#).unwrap();
        assert!(entry.download_url.is_none());
    }
}
