//! MkDocs configuration and site building.
//!
//! [`MkdocsConfig`] is the `mkdocs.yml` written next to the docs tree.
//! [`SiteBuilder`] is the seam around the external static-site build so the
//! pipeline can be tested without MkDocs installed.

use crate::config::SiteConfig;
use crate::types::NavEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Could not run `{command}`: {source}")]
    Spawn {
        command: String,
        source: io::Error,
    },
    #[error("Site build failed ({status})\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigWriteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MkdocsConfig {
    pub site_name: String,
    pub repo_url: String,
    pub docs_dir: String,
    pub site_dir: String,
    pub theme: Theme,
    pub nav: Vec<NavEntry>,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extra {
    pub build_time: String,
}

impl MkdocsConfig {
    /// Assemble the config from site settings, an optional release version
    /// and the synthesized navigation.
    pub fn new(
        config: &SiteConfig,
        version: Option<&str>,
        nav: Vec<NavEntry>,
        built_at: DateTime<Utc>,
    ) -> Self {
        let site_name = match version {
            Some(v) => format!("{} {}", config.site_name, v),
            None => config.site_name.clone(),
        };
        Self {
            site_name,
            repo_url: config.repository.repo_url(),
            docs_dir: config.output.docs_dir.clone(),
            site_dir: config.output.site_dir.clone(),
            theme: Theme {
                name: config.output.theme.clone(),
            },
            nav,
            extra: Extra {
                build_time: built_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            },
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigWriteError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

/// Turns a prepared project directory into a built site.
pub trait SiteBuilder {
    fn build(&self, project_dir: &Path) -> Result<(), BuildError>;
}

/// Runs `<command> build` in the project directory.
#[derive(Debug, Clone)]
pub struct MkDocsBuilder {
    command: String,
}

impl MkDocsBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for MkDocsBuilder {
    fn default() -> Self {
        Self::new("mkdocs")
    }
}

impl SiteBuilder for MkDocsBuilder {
    fn build(&self, project_dir: &Path) -> Result<(), BuildError> {
        tracing::debug!(command = %self.command, dir = %project_dir.display(), "Running site build");
        let output = Command::new(&self.command)
            .arg("build")
            .current_dir(project_dir)
            .output()
            .map_err(|source| BuildError::Spawn {
                command: format!("{} build", self.command),
                source,
            })?;

        if !output.status.success() {
            return Err(BuildError::Failed {
                status: output.status.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn sample(version: Option<&str>) -> MkdocsConfig {
        let nav = vec![
            NavEntry::page("Home", "README.md"),
            NavEntry::page("CLI", "CLI.md"),
        ];
        MkdocsConfig::new(&SiteConfig::default(), version, nav, fixed_time())
    }

    #[test]
    fn fields_come_from_config() {
        let config = sample(None);
        assert_eq!(config.site_name, "Runvoy");
        assert_eq!(config.repo_url, "https://github.com/runvoy/runvoy");
        assert_eq!(config.docs_dir, "docs");
        assert_eq!(config.site_dir, "site");
        assert_eq!(config.theme.name, "material");
        assert_eq!(config.extra.build_time, "2024-03-09 14:05:07 UTC");
    }

    #[test]
    fn version_appended_to_site_name() {
        assert_eq!(sample(Some("v0.4.1")).site_name, "Runvoy v0.4.1");
    }

    #[test]
    fn yaml_keeps_nav_order_as_single_key_maps() {
        let yaml = sample(None).to_yaml().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["theme"]["name"].as_str(), Some("material"));
        assert_eq!(
            value["extra"]["build_time"].as_str(),
            Some("2024-03-09 14:05:07 UTC")
        );
        let nav = value["nav"].as_sequence().unwrap();
        assert_eq!(nav.len(), 2);
        assert_eq!(nav[0]["Home"].as_str(), Some("README.md"));
        assert_eq!(nav[1]["CLI"].as_str(), Some("CLI.md"));
    }

    #[test]
    fn write_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mkdocs.yml");
        sample(None).write(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("site_name: Runvoy"));
        assert!(text.contains("docs_dir: docs"));
    }

    #[test]
    fn missing_command_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let builder = MkDocsBuilder::new("docflat-no-such-command");
        let err = builder.build(tmp.path()).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
        assert!(err.to_string().contains("docflat-no-such-command build"));
    }

    // `sh build` runs a script named `build` from the project directory.
    #[cfg(unix)]
    #[test]
    fn failing_command_captures_output() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("build"),
            "echo building\necho 'no mkdocs.yml' >&2\nexit 3\n",
        )
        .unwrap();

        let err = MkDocsBuilder::new("sh").build(tmp.path()).unwrap_err();
        let BuildError::Failed { stdout, stderr, .. } = &err else {
            panic!("expected build failure, got {err:?}");
        };
        assert_eq!(stdout.trim(), "building");
        assert_eq!(stderr.trim(), "no mkdocs.yml");
        assert!(err.to_string().contains("no mkdocs.yml"));
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_runs_in_project_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("build"), "touch built\n").unwrap();

        MkDocsBuilder::new("sh").build(tmp.path()).unwrap();
        assert!(tmp.path().join("built").exists());
    }
}
