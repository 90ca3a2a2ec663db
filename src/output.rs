//! CLI output formatting for the assembly pipeline.
//!
//! # Output Format
//!
//! Stage headers start with `==>`. Documents are shown as origin path,
//! with the flattened destination after an arrow once written:
//!
//! ```text
//! ==> Fetching from runvoy/runvoy@main
//!     README.md
//!     docs/CLI.md
//! ==> Writing 2 documents → docs
//!     README.md → README.md
//!     docs/CLI.md → CLI.md
//! ==> Navigation
//! 001 Home → README.md
//! 002 CLI → CLI.md
//! 003 Guide
//!     001 Setup → guide/SETUP.md
//! ==> Wrote mkdocs.yml
//! ==> Building site
//! ==> Site built → site
//! ```
//!
//! # Architecture
//!
//! Each piece of output has a `format_*` function (returns `Vec<String>`)
//! for testability and a `print_*` wrapper that writes to stdout (stderr
//! for fatal errors). Format
//! functions are pure: no I/O, no side effects.

use crate::assemble::{AssembleEvent, Outcome};
use crate::types::NavEntry;
use std::path::Path;

const ARROW: &str = "\u{2192}";

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn stage(title: impl AsRef<str>) -> String {
    format!("==> {}", title.as_ref())
}

/// Last component of a path for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Navigation tree
// ============================================================================

/// Format the navigation tree with per-level positional indices.
///
/// ```text
/// 001 Home → README.md
/// 002 Guide
///     001 Setup → guide/SETUP.md
/// 003 GitHub → https://github.com/runvoy/runvoy
/// ```
pub fn format_nav(nav: &[NavEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    format_nav_level(nav, 0, &mut lines);
    lines
}

fn format_nav_level(entries: &[NavEntry], depth: usize, lines: &mut Vec<String>) {
    for (i, entry) in entries.iter().enumerate() {
        let header = format!("{}{} {}", indent(depth), format_index(i + 1), entry.label());
        match entry {
            NavEntry::Section { children, .. } => {
                lines.push(header);
                format_nav_level(children, depth + 1, lines);
            }
            NavEntry::Page { path: target, .. } | NavEntry::External { url: target, .. } => {
                lines.push(format!("{header} {ARROW} {target}"));
            }
        }
    }
}

/// Print the navigation tree to stdout.
pub fn print_nav(nav: &[NavEntry]) {
    for line in format_nav(nav) {
        println!("{}", line);
    }
}

// ============================================================================
// Pipeline progress
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_event(event: &AssembleEvent) -> Vec<String> {
    match event {
        AssembleEvent::Fetching { origin } => vec![stage(format!("Fetching from {origin}"))],
        AssembleEvent::Fetched { path } => vec![format!("    {path}")],
        AssembleEvent::FetchFailed { error, kept } => vec![
            format!("    Fetch stopped early: {error}"),
            format!("    Continuing with {kept} document(s)"),
        ],
        AssembleEvent::ReferenceMerged { path } => vec![format!("    {path} (API reference)")],
        AssembleEvent::Writing { count, docs_dir } => vec![stage(format!(
            "Writing {count} documents {ARROW} {}",
            docs_dir.display()
        ))],
        AssembleEvent::Wrote {
            origin,
            destination,
        } => vec![format!("    {origin} {ARROW} {destination}")],
        AssembleEvent::Navigation { nav } => {
            let mut lines = vec![stage("Navigation")];
            lines.extend(format_nav(nav));
            lines
        }
        AssembleEvent::ConfigWritten { path } => {
            vec![stage(format!("Wrote {}", display_name(path)))]
        }
        AssembleEvent::Building => vec![stage("Building site")],
        AssembleEvent::Built { site_dir } => vec![stage(format!(
            "Site built {ARROW} {}",
            site_dir.display()
        ))],
    }
}

/// Format the final summary line for a pipeline run.
pub fn format_outcome(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::NoDocuments => vec!["No documents found; nothing to do".to_string()],
        Outcome::Built(report) => {
            let count = report.written.len();
            let noun = if count == 1 { "document" } else { "documents" };
            vec![format!("Assembled {count} {noun} for \"{}\"", report.site_name)]
        }
    }
}

/// Print the final summary to stdout.
pub fn print_outcome(outcome: &Outcome) {
    for line in format_outcome(outcome) {
        println!("{}", line);
    }
}

/// Format a fatal error with its `Display` form, one line per line of the
/// message, so captured build output keeps its layout.
pub fn format_error(err: &dyn std::error::Error) -> Vec<String> {
    let message = format!("Error: {err}");
    message.lines().map(str::to_string).collect()
}

/// Print a fatal error to stderr.
pub fn print_error(err: &dyn std::error::Error) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::AssembleReport;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn nav_lines_are_indexed() {
        let nav = vec![
            NavEntry::page("Home", "README.md"),
            NavEntry::page("CLI", "CLI.md"),
        ];
        assert_eq!(
            format_nav(&nav),
            vec!["001 Home \u{2192} README.md", "002 CLI \u{2192} CLI.md"]
        );
    }

    #[test]
    fn nested_sections_indent_and_restart_numbering() {
        let nav = vec![
            NavEntry::page("Home", "README.md"),
            NavEntry::Section {
                label: "Guide".into(),
                children: vec![
                    NavEntry::page("Setup", "guide/SETUP.md"),
                    NavEntry::page("Usage", "guide/USAGE.md"),
                ],
            },
            NavEntry::External {
                label: "GitHub".into(),
                url: "https://github.com/runvoy/runvoy".into(),
            },
        ];
        assert_eq!(
            format_nav(&nav),
            vec![
                "001 Home \u{2192} README.md",
                "002 Guide",
                "    001 Setup \u{2192} guide/SETUP.md",
                "    002 Usage \u{2192} guide/USAGE.md",
                "003 GitHub \u{2192} https://github.com/runvoy/runvoy",
            ]
        );
    }

    #[test]
    fn empty_nav_has_no_lines() {
        assert!(format_nav(&[]).is_empty());
    }

    #[test]
    fn stage_events_have_arrow_headers() {
        assert_eq!(
            format_event(&AssembleEvent::Fetching {
                origin: "runvoy/runvoy@main".into()
            }),
            vec!["==> Fetching from runvoy/runvoy@main"]
        );
        assert_eq!(
            format_event(&AssembleEvent::Writing {
                count: 3,
                docs_dir: PathBuf::from("docs")
            }),
            vec!["==> Writing 3 documents \u{2192} docs"]
        );
        assert_eq!(
            format_event(&AssembleEvent::ConfigWritten {
                path: PathBuf::from("/work/project/mkdocs.yml")
            }),
            vec!["==> Wrote mkdocs.yml"]
        );
        assert_eq!(format_event(&AssembleEvent::Building), vec!["==> Building site"]);
    }

    #[test]
    fn document_events_are_indented() {
        assert_eq!(
            format_event(&AssembleEvent::Wrote {
                origin: "docs/CLI.md".into(),
                destination: "CLI.md".into()
            }),
            vec!["    docs/CLI.md \u{2192} CLI.md"]
        );
        assert_eq!(
            format_event(&AssembleEvent::Fetched {
                path: "docs/CLI.md".into()
            }),
            vec!["    docs/CLI.md"]
        );
    }

    #[test]
    fn fetch_failure_reports_kept_count() {
        let lines = format_event(&AssembleEvent::FetchFailed {
            error: "HTTP 403".into(),
            kept: 2,
        });
        assert_eq!(
            lines,
            vec![
                "    Fetch stopped early: HTTP 403",
                "    Continuing with 2 document(s)"
            ]
        );
    }

    #[test]
    fn navigation_event_includes_tree() {
        let lines = format_event(&AssembleEvent::Navigation {
            nav: vec![NavEntry::page("Home", "README.md")],
        });
        assert_eq!(lines, vec!["==> Navigation", "001 Home \u{2192} README.md"]);
    }

    #[test]
    fn build_error_keeps_captured_output_lines() {
        let err = crate::mkdocs::BuildError::Failed {
            status: "exit status: 1".into(),
            stdout: "INFO - Building documentation".into(),
            stderr: "ERROR - Config value 'nav': missing file\nAborted".into(),
        };
        assert_eq!(
            format_error(&err),
            vec![
                "Error: Site build failed (exit status: 1)",
                "--- stdout ---",
                "INFO - Building documentation",
                "--- stderr ---",
                "ERROR - Config value 'nav': missing file",
                "Aborted",
            ]
        );
    }

    #[test]
    fn outcome_summary() {
        assert_eq!(
            format_outcome(&Outcome::NoDocuments),
            vec!["No documents found; nothing to do"]
        );
        let report = AssembleReport {
            site_name: "Runvoy v1.0.0".into(),
            written: vec!["README.md".into()],
            nav: Vec::new(),
            config_path: PathBuf::from("mkdocs.yml"),
        };
        assert_eq!(
            format_outcome(&Outcome::Built(report)),
            vec!["Assembled 1 document for \"Runvoy v1.0.0\""]
        );
    }
}
