//! The assembly pipeline.
//!
//! ```text
//! 1. Fetch      source     →  Documents          (partial results kept)
//! 2. Reference  gomarkdoc  →  API_REFERENCE.md   (optional)
//! 3. Rewrite    Documents  →  docs/              (flatten paths, rewrite links)
//! 4. Navigate   paths      →  nav
//! 5. Configure  nav        →  mkdocs.yml
//! 6. Build      mkdocs.yml →  site/              (skipped by `prepare`)
//! ```
//!
//! An empty fetch stops the pipeline before step 3: nothing is deleted,
//! nothing is written and the builder is never invoked.
//!
//! Progress is reported as [`AssembleEvent`]s over an optional channel so
//! the CLI can print from its own thread while the pipeline runs.

use crate::config::SiteConfig;
use crate::flatten::Flattener;
use crate::mkdocs::{BuildError, ConfigWriteError, MkdocsConfig, SiteBuilder};
use crate::nav::NavBuilder;
use crate::reference::load_reference;
use crate::rewrite::LinkRewriter;
use crate::source::DocumentSource;
use crate::types::{Documents, NavEntry, RewrittenDocument};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not write site config: {0}")]
    Config(#[from] ConfigWriteError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Progress reported while the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleEvent {
    Fetching { origin: String },
    Fetched { path: String },
    /// The source stopped early; `kept` documents arrived before it did.
    FetchFailed { error: String, kept: usize },
    ReferenceMerged { path: String },
    Writing { count: usize, docs_dir: PathBuf },
    Wrote { origin: String, destination: String },
    Navigation { nav: Vec<NavEntry> },
    ConfigWritten { path: PathBuf },
    Building,
    Built { site_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The source produced nothing; the output tree was left alone.
    NoDocuments,
    Built(AssembleReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembleReport {
    pub site_name: String,
    /// Destination paths, relative to the docs directory, in write order.
    pub written: Vec<String>,
    pub nav: Vec<NavEntry>,
    pub config_path: PathBuf,
}

/// Documents collected from a source, plus the release version if known.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub documents: Documents,
    pub version: Option<String>,
}

pub struct Assembler {
    config: SiteConfig,
    project_dir: PathBuf,
    flattener: Flattener,
    rewriter: LinkRewriter,
    nav: NavBuilder,
    events: Option<Sender<AssembleEvent>>,
}

impl Assembler {
    pub fn new(config: SiteConfig, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            flattener: Flattener::new(&config.layout.docs_root),
            rewriter: LinkRewriter::new(&config.repository, &config.layout),
            nav: NavBuilder::new(&config.navigation),
            project_dir: project_dir.into(),
            events: None,
            config,
        }
    }

    /// Report progress on `tx`. Send failures (a dropped receiver) are ignored.
    pub fn with_events(mut self, tx: Sender<AssembleEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.output.docs_dir)
    }

    pub fn site_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.output.site_dir)
    }

    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(&self.config.output.config_file)
    }

    fn emit(&self, event: AssembleEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    /// Fetch everything the site is made of.
    ///
    /// Never fails: a source error keeps what arrived before it, a missing
    /// reference or version only costs that extra.
    pub fn collect(&self, source: &dyn DocumentSource) -> Collected {
        let origin = source.describe();
        self.emit(AssembleEvent::Fetching {
            origin: origin.clone(),
        });

        let mut documents = Documents::new();
        if let Err(e) = source.fetch(&mut documents) {
            warn!(source = %origin, error = %e, kept = documents.len(), "Fetch failed; continuing with partial results");
            self.emit(AssembleEvent::FetchFailed {
                error: e.to_string(),
                kept: documents.len(),
            });
        }
        for path in documents.keys() {
            self.emit(AssembleEvent::Fetched { path: path.clone() });
        }

        self.merge_reference(&mut documents);

        let version = if self.config.fetch.fetch_version && !documents.is_empty() {
            match source.version() {
                Ok(version) => version,
                Err(e) => {
                    warn!(source = %origin, error = %e, "Could not read VERSION");
                    None
                }
            }
        } else {
            None
        };

        Collected { documents, version }
    }

    fn merge_reference(&self, documents: &mut Documents) {
        let Some(source) = &self.config.reference.source else {
            return;
        };
        let path = self.project_dir.join(source);
        match load_reference(&path) {
            Ok(Some(markdown)) => {
                let target = self.config.navigation.reference.clone();
                debug!(from = %path.display(), to = %target, "Merged API reference");
                self.emit(AssembleEvent::ReferenceMerged {
                    path: target.clone(),
                });
                documents.insert(target, markdown);
            }
            Ok(None) => warn!(path = %path.display(), "API reference source not found; skipping"),
            Err(e) => warn!(error = %e, "Could not read API reference; skipping"),
        }
    }

    /// Flatten and rewrite every document. Pure; touches no files.
    pub fn rewrite(&self, documents: &Documents) -> Vec<RewrittenDocument> {
        let mut by_destination: BTreeMap<String, RewrittenDocument> = BTreeMap::new();
        for (origin, text) in documents {
            let destination = self.flattener.flatten(origin);
            let doc = RewrittenDocument {
                origin_path: origin.clone(),
                destination_path: destination.clone(),
                text: self.rewriter.rewrite(text, origin),
            };
            if let Some(previous) = by_destination.insert(destination.clone(), doc) {
                warn!(
                    destination = %destination,
                    replaced = %previous.origin_path,
                    by = %origin,
                    "Two documents flatten to the same path; keeping the later one"
                );
            }
        }
        by_destination.into_values().collect()
    }

    /// Navigation over the flattened path set.
    pub fn navigation(&self, rewritten: &[RewrittenDocument]) -> Vec<NavEntry> {
        self.nav
            .build(rewritten.iter().map(|d| d.destination_path.as_str()))
    }

    /// Fetch, rewrite and write the docs tree and `mkdocs.yml`, without
    /// running the site build.
    pub fn prepare(&self, source: &dyn DocumentSource) -> Result<Outcome, AssembleError> {
        let collected = self.collect(source);
        if collected.documents.is_empty() {
            info!(source = %source.describe(), "No documents found; nothing to assemble");
            return Ok(Outcome::NoDocuments);
        }

        let rewritten = self.rewrite(&collected.documents);
        let written = self.write_documents(&rewritten)?;

        let nav = self.navigation(&rewritten);
        self.emit(AssembleEvent::Navigation { nav: nav.clone() });

        let mkdocs = MkdocsConfig::new(
            &self.config,
            collected.version.as_deref(),
            nav.clone(),
            Utc::now(),
        );
        let config_path = self.config_path();
        mkdocs.write(&config_path)?;
        self.emit(AssembleEvent::ConfigWritten {
            path: config_path.clone(),
        });

        Ok(Outcome::Built(AssembleReport {
            site_name: mkdocs.site_name,
            written,
            nav,
            config_path,
        }))
    }

    /// The full pipeline: [`prepare`](Self::prepare), then build the site.
    pub fn run(
        &self,
        source: &dyn DocumentSource,
        builder: &dyn SiteBuilder,
    ) -> Result<Outcome, AssembleError> {
        let outcome = self.prepare(source)?;
        if outcome == Outcome::NoDocuments {
            return Ok(outcome);
        }

        self.emit(AssembleEvent::Building);
        builder.build(&self.project_dir)?;
        self.emit(AssembleEvent::Built {
            site_dir: self.site_dir(),
        });
        Ok(outcome)
    }

    /// Replace the docs directory with the rewritten documents.
    fn write_documents(&self, rewritten: &[RewrittenDocument]) -> Result<Vec<String>, AssembleError> {
        let docs_dir = self.docs_dir();
        self.emit(AssembleEvent::Writing {
            count: rewritten.len(),
            docs_dir: PathBuf::from(&self.config.output.docs_dir),
        });

        if docs_dir.exists() {
            fs::remove_dir_all(&docs_dir)?;
        }
        fs::create_dir_all(&docs_dir)?;

        let mut written = Vec::with_capacity(rewritten.len());
        for doc in rewritten {
            write_document(&docs_dir, doc)?;
            self.emit(AssembleEvent::Wrote {
                origin: doc.origin_path.clone(),
                destination: doc.destination_path.clone(),
            });
            written.push(doc.destination_path.clone());
        }
        Ok(written)
    }
}

fn write_document(docs_dir: &Path, doc: &RewrittenDocument) -> std::io::Result<()> {
    let path = docs_dir.join(&doc.destination_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &doc.text)
}
