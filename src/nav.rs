//! Navigation tree synthesis.
//!
//! Takes the full set of flattened paths and produces the ordered `nav`
//! list for `mkdocs.yml`:
//!
//! ```text
//! - Home: README.md                 # home document, pinned first
//! - Architecture: ARCHITECTURE.md   # everything else, by path
//! - CLI: CLI.md
//! - Code of Conduct: CODE_OF_CONDUCT.md
//! - API Reference: API_REFERENCE.md # reference document, pinned last
//! ```
//!
//! Labels come from [`crate::title::title`]; the home and reference
//! documents use their configured labels instead.

use crate::config::{ExtraLink, NavigationConfig};
use crate::title::title;
use crate::types::NavEntry;
use std::collections::BTreeSet;

/// Builds navigation from flattened paths.
#[derive(Debug, Clone)]
pub struct NavBuilder {
    home: String,
    home_label: String,
    reference: String,
    reference_label: String,
    group_directories: bool,
    extra_links: Vec<ExtraLink>,
}

impl NavBuilder {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            home: config.home.clone(),
            home_label: config.home_label.clone(),
            reference: config.reference.clone(),
            reference_label: config.reference_label.clone(),
            group_directories: config.group_directories,
            extra_links: config.extra_links.clone(),
        }
    }

    /// Build the navigation tree.
    ///
    /// Home first (if present), then the remaining paths in lexicographic
    /// order, then extra links, then the reference document (if present).
    pub fn build<I, S>(&self, flattened_paths: I) -> Vec<NavEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut remaining: BTreeSet<String> =
            flattened_paths.into_iter().map(Into::into).collect();

        let home = remaining.take(&self.home);
        let reference = remaining.take(&self.reference);

        let mut nav = Vec::with_capacity(remaining.len() + 2);
        if let Some(path) = home {
            nav.push(NavEntry::page(&self.home_label, path));
        }

        // BTreeSet iterates in byte-wise lexicographic order.
        if self.group_directories {
            nav.extend(group_by_directory(remaining));
        } else {
            nav.extend(remaining.into_iter().map(|path| NavEntry::page(title(&path), path)));
        }

        nav.extend(self.extra_links.iter().map(|link| NavEntry::External {
            label: link.label.clone(),
            url: link.url.clone(),
        }));

        if let Some(path) = reference {
            nav.push(NavEntry::page(&self.reference_label, path));
        }
        nav
    }
}

impl Default for NavBuilder {
    fn default() -> Self {
        Self::new(&NavigationConfig::default())
    }
}

/// Nest sorted paths under one section per directory level.
///
/// Sections appear where their first document would have appeared in the
/// flat list, so the overall order still follows the sorted paths.
fn group_by_directory(sorted_paths: impl IntoIterator<Item = String>) -> Vec<NavEntry> {
    let mut root = Vec::new();
    for path in sorted_paths {
        let dirs: Vec<&str> = path.split('/').collect();
        let (dirs, _file) = dirs.split_at(dirs.len() - 1);
        insert_nested(&mut root, dirs, NavEntry::page(title(&path), path.clone()));
    }
    root
}

fn insert_nested(level: &mut Vec<NavEntry>, dirs: &[&str], entry: NavEntry) {
    let Some((dir, rest)) = dirs.split_first() else {
        level.push(entry);
        return;
    };
    let label = title(dir);
    let existing = level.iter_mut().rev().find_map(|e| match e {
        NavEntry::Section { label: l, children } if *l == label => Some(children),
        _ => None,
    });
    match existing {
        Some(children) => insert_nested(children, rest, entry),
        None => {
            let mut children = Vec::new();
            insert_nested(&mut children, rest, entry);
            level.push(NavEntry::Section { label, children });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(nav: &[NavEntry]) -> Vec<&str> {
        nav.iter().map(NavEntry::label).collect()
    }

    fn targets(nav: &[NavEntry]) -> Vec<&str> {
        nav.iter().filter_map(NavEntry::target).collect()
    }

    #[test]
    fn home_pinned_first() {
        let nav = NavBuilder::default().build(["Z.md", "README.md", "A.md"]);
        assert_eq!(targets(&nav), vec!["README.md", "A.md", "Z.md"]);
        assert_eq!(nav[0].label(), "Home");
    }

    #[test]
    fn reference_pinned_last() {
        let nav = NavBuilder::default().build([
            "API_REFERENCE.md",
            "CLI.md",
            "README.md",
            "ARCHITECTURE.md",
        ]);
        assert_eq!(
            labels(&nav),
            vec!["Home", "Architecture", "CLI", "API Reference"]
        );
        assert_eq!(nav.last().unwrap().target(), Some("API_REFERENCE.md"));
    }

    #[test]
    fn no_home_or_reference() {
        let nav = NavBuilder::default().build(["TESTING.md", "CODE_OF_CONDUCT.md"]);
        assert_eq!(
            nav,
            vec![
                NavEntry::page("Code of Conduct", "CODE_OF_CONDUCT.md"),
                NavEntry::page("Testing", "TESTING.md"),
            ]
        );
    }

    #[test]
    fn empty_input_gives_empty_nav() {
        let nav = NavBuilder::default().build(Vec::<String>::new());
        assert!(nav.is_empty());
    }

    #[test]
    fn sort_is_by_full_path() {
        let nav = NavBuilder::default().build(["guide/A.md", "Z.md", "B.md", "a.md"]);
        // Uppercase sorts before lowercase byte-wise.
        assert_eq!(targets(&nav), vec!["B.md", "Z.md", "a.md", "guide/A.md"]);
    }

    #[test]
    fn duplicate_paths_collapse() {
        let nav = NavBuilder::default().build(["CLI.md", "CLI.md"]);
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn nested_home_is_not_pinned() {
        let nav = NavBuilder::default().build(["cmd/README.md", "A.md"]);
        assert_eq!(labels(&nav), vec!["A", "Readme"]);
    }

    #[test]
    fn custom_labels_and_documents() {
        let config = NavigationConfig {
            home: "INDEX.md".into(),
            home_label: "Start".into(),
            reference: "GO_API.md".into(),
            reference_label: "Go API".into(),
            ..NavigationConfig::default()
        };
        let nav = NavBuilder::new(&config).build(["GO_API.md", "INDEX.md", "README.md"]);
        assert_eq!(labels(&nav), vec!["Start", "Readme", "Go API"]);
    }

    #[test]
    fn extra_links_before_reference() {
        let config = NavigationConfig {
            extra_links: vec![ExtraLink {
                label: "GitHub".into(),
                url: "https://github.com/runvoy/runvoy".into(),
            }],
            ..NavigationConfig::default()
        };
        let nav = NavBuilder::new(&config).build(["README.md", "CLI.md", "API_REFERENCE.md"]);
        assert_eq!(labels(&nav), vec!["Home", "CLI", "GitHub", "API Reference"]);
        assert!(matches!(nav[2], NavEntry::External { .. }));
    }

    #[test]
    fn grouping_nests_directories() {
        let config = NavigationConfig {
            group_directories: true,
            ..NavigationConfig::default()
        };
        let nav = NavBuilder::new(&config).build([
            "README.md",
            "CLI.md",
            "guide/SETUP.md",
            "guide/USAGE.md",
            "guide/advanced/TUNING.md",
            "ZEBRA.md",
        ]);

        // Lowercase `guide/` sorts after every uppercase root document.
        assert_eq!(labels(&nav), vec!["Home", "CLI", "Zebra", "Guide"]);
        let NavEntry::Section { children, .. } = &nav[3] else {
            panic!("expected a section, got {:?}", nav[3]);
        };
        assert_eq!(labels(children), vec!["Setup", "Usage", "Advanced"]);
        let NavEntry::Section { children: inner, .. } = &children[2] else {
            panic!("expected nested section");
        };
        assert_eq!(targets(inner), vec!["guide/advanced/TUNING.md"]);
    }

    #[test]
    fn grouping_without_directories_is_flat() {
        let config = NavigationConfig {
            group_directories: true,
            ..NavigationConfig::default()
        };
        let grouped = NavBuilder::new(&config).build(["README.md", "A.md", "Z.md"]);
        let flat = NavBuilder::default().build(["README.md", "A.md", "Z.md"]);
        assert_eq!(grouped, flat);
    }
}
