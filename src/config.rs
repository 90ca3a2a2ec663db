//! Site configuration module.
//!
//! Handles loading, validating, and merging `docflat.toml`. Stock defaults
//! describe the Runvoy repository; a user config file overrides any subset.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "Runvoy"
//!
//! [repository]
//! name = "runvoy/runvoy"          # owner/repo on GitHub
//! branch = "main"
//! api_url = "https://api.github.com"
//! web_url = "https://github.com"  # base for links to non-doc files
//!
//! [layout]
//! docs_root = "docs/"             # stripped when flattening
//!
//! [navigation]
//! home = "README.md"              # pinned first
//! home_label = "Home"
//! reference = "API_REFERENCE.md"  # pinned last
//! reference_label = "API Reference"
//! group_directories = false
//!
//! [fetch]
//! exclude = ["LICENSE", "CHANGELOG", "AGENTS", ".gitignore", ".github"]
//! fetch_version = true
//!
//! [reference]
//! # source = "gomarkdoc"          # SGML dump converted to the reference doc
//!
//! [output]
//! docs_dir = "docs"
//! site_dir = "site"
//! config_file = "mkdocs.yml"
//! theme = "material"
//! build_command = "mkdocs"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `docflat.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title; the repository's `VERSION` is appended when available.
    pub site_name: String,
    /// Where the documentation comes from.
    pub repository: RepoConfig,
    /// Source tree layout.
    pub layout: LayoutConfig,
    /// Navigation pinning and grouping.
    pub navigation: NavigationConfig,
    /// Which files are collected.
    pub fetch: FetchConfig,
    /// Generated API reference input.
    pub reference: ReferenceConfig,
    /// Output locations and the MkDocs invocation.
    pub output: OutputConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Runvoy".to_string(),
            repository: RepoConfig::default(),
            layout: LayoutConfig::default(),
            navigation: NavigationConfig::default(),
            fetch: FetchConfig::default(),
            reference: ReferenceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_repo = self
            .repository
            .name
            .split_once('/')
            .is_some_and(|(owner, repo)| {
                !owner.is_empty() && !repo.is_empty() && !repo.contains('/')
            });
        if !valid_repo {
            return Err(ConfigError::Validation(format!(
                "repository.name must be \"owner/repo\", got {:?}",
                self.repository.name
            )));
        }
        if self.repository.branch.is_empty() {
            return Err(ConfigError::Validation(
                "repository.branch must not be empty".into(),
            ));
        }
        if self.layout.docs_root.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "layout.docs_root must not be empty".into(),
            ));
        }
        // The docs dir is deleted on every run.
        let docs_dir = self.output.docs_dir.trim_matches('/');
        if docs_dir.is_empty() || docs_dir == "." || docs_dir == ".." {
            return Err(ConfigError::Validation(
                "output.docs_dir must name a dedicated directory".into(),
            ));
        }
        if docs_dir == self.output.site_dir.trim_matches('/') {
            return Err(ConfigError::Validation(
                "output.docs_dir and output.site_dir must differ".into(),
            ));
        }
        if self.navigation.home == self.navigation.reference {
            return Err(ConfigError::Validation(
                "navigation.home and navigation.reference must differ".into(),
            ));
        }
        if self.output.build_command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.build_command must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Source repository coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// `owner/repo`.
    pub name: String,
    pub branch: String,
    /// GitHub REST API root.
    pub api_url: String,
    /// GitHub web root, used for links that leave the generated site.
    pub web_url: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            name: "runvoy/runvoy".to_string(),
            branch: "main".to_string(),
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
        }
    }
}

impl RepoConfig {
    /// Web URL of the repository, e.g. `https://github.com/runvoy/runvoy`.
    pub fn repo_url(&self) -> String {
        format!("{}/{}", self.web_url.trim_end_matches('/'), self.name)
    }

    /// Base URL for viewing files on the configured branch.
    pub fn blob_base(&self) -> String {
        format!("{}/blob/{}", self.repo_url(), self.branch)
    }

    /// REST API root for this repository.
    pub fn api_repo_url(&self) -> String {
        format!("{}/repos/{}", self.api_url.trim_end_matches('/'), self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Leading directory stripped from paths when flattening.
    pub docs_root: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            docs_root: "docs/".to_string(),
        }
    }
}

/// Navigation synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Flattened path of the entry-point document, pinned first.
    pub home: String,
    pub home_label: String,
    /// Flattened path of the generated reference document, pinned last.
    pub reference: String,
    pub reference_label: String,
    /// Nest documents in subdirectories under a section per directory.
    pub group_directories: bool,
    /// External links appended after the documents.
    pub extra_links: Vec<ExtraLink>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            home: "README.md".to_string(),
            home_label: "Home".to_string(),
            reference: "API_REFERENCE.md".to_string(),
            reference_label: "API Reference".to_string(),
            group_directories: false,
            extra_links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraLink {
    pub label: String,
    pub url: String,
}

/// Retrieval filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Path components starting with any of these are skipped.
    pub exclude: Vec<String>,
    /// Read the repository's `VERSION` file into the site name.
    pub fetch_version: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            exclude: ["LICENSE", "CHANGELOG", "AGENTS", ".gitignore", ".github"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fetch_version: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    /// Path to a gomarkdoc SGML dump, relative to the project directory.
    pub source: Option<String>,
}

/// Output locations, relative to the project directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Rewritten markdown tree (deleted and recreated on every run).
    pub docs_dir: String,
    /// Where MkDocs writes the built site.
    pub site_dir: String,
    pub config_file: String,
    /// MkDocs theme name.
    pub theme: String,
    /// Executable invoked as `<build_command> build`.
    pub build_command: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            site_dir: "site".to_string(),
            config_file: "mkdocs.yml".to_string(),
            theme: "material".to_string(),
            build_command: "mkdocs".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `docflat.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docflat Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Site title. The repository's VERSION file is appended when present.
site_name = "Runvoy"

# ---------------------------------------------------------------------------
# Source repository
# ---------------------------------------------------------------------------
[repository]
name = "runvoy/runvoy"
branch = "main"
api_url = "https://api.github.com"
# Links to files outside the docs (configs, LICENSE, ./README.md) point here.
web_url = "https://github.com"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Stripped from paths so docs/CLI.md lands next to README.md.
docs_root = "docs/"

# ---------------------------------------------------------------------------
# Navigation
# ---------------------------------------------------------------------------
[navigation]
home = "README.md"
home_label = "Home"
reference = "API_REFERENCE.md"
reference_label = "API Reference"
# Nest docs/guide/*.md under a "Guide" section instead of listing them flat.
group_directories = false

# External links listed after the documents:
# [[navigation.extra_links]]
# label = "GitHub"
# url = "https://github.com/runvoy/runvoy"

# ---------------------------------------------------------------------------
# Retrieval
# ---------------------------------------------------------------------------
[fetch]
# Any path component starting with one of these is skipped.
exclude = ["LICENSE", "CHANGELOG", "AGENTS", ".gitignore", ".github"]
fetch_version = true

# ---------------------------------------------------------------------------
# API reference
# ---------------------------------------------------------------------------
[reference]
# gomarkdoc SGML dump converted into the reference document.
# source = "gomarkdoc"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Deleted and recreated on every run.
docs_dir = "docs"
site_dir = "site"
config_file = "mkdocs.yml"
theme = "material"
build_command = "mkdocs"
"##
}
