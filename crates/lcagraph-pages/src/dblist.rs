//! Database-list bookkeeping.
//!
//! The corpus keeps two index pages, `pd_db.md` and `ps_db.md`, grouping
//! entity pages into supply-chain categories. Updating a list re-reads the
//! existing categorization, lists the page stems actually present in the
//! corresponding folder, and appends anything unreferenced to the
//! `To be classified` section. Already-categorized entries keep their
//! category.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

/// Category headings, in the order they are written.
pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "## End products or processes",
    "## Downstream",
    "## Midstream",
    "## Upstream",
    "## To be classified",
];

const UNCLASSIFIED: &str = "## To be classified";

/// Outcome of one list update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbListReport {
    /// Entries newly appended under `To be classified`.
    pub added: usize,
    /// Total entries written across all categories.
    pub total: usize,
}

/// Sync `db_path` with the page stems found in `folder`.
pub fn update_db_list(folder: &Path, db_path: &Path) -> Result<DbListReport> {
    let existing = if db_path.exists() {
        std::fs::read_to_string(db_path)
            .with_context(|| format!("failed to read {}", db_path.display()))?
    } else {
        String::new()
    };
    let mut categories = parse_categories(&existing);

    let mut stems = BTreeSet::new();
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("failed to list {}", folder.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) {
            stems.insert(format!("* [{stem}]({stem})"));
        }
    }

    let categorized: BTreeSet<String> = categories.values().flatten().cloned().collect();
    let fresh: Vec<String> = stems.difference(&categorized).cloned().collect();
    let added = fresh.len();
    categories
        .entry(UNCLASSIFIED.to_string())
        .or_default()
        .extend(fresh);

    let mut out = String::new();
    let mut total = 0;
    for category in DEFAULT_CATEGORIES {
        let _ = writeln!(out, "{category}");
        out.push('\n');
        if let Some(entries) = categories.get(category) {
            let unique: BTreeSet<&String> = entries.iter().collect();
            for entry in unique {
                let _ = writeln!(out, "{entry}");
                total += 1;
            }
        }
        out.push('\n');
    }

    std::fs::write(db_path, out)
        .with_context(|| format!("failed to write {}", db_path.display()))?;
    Ok(DbListReport { added, total })
}

/// Read `## ` categories and their `* [...]` entries.
///
/// Categories outside [`DEFAULT_CATEGORIES`] are parsed (so their entries
/// are not re-added as new) but are dropped on write, matching the legacy
/// list layout.
fn parse_categories(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut categories: BTreeMap<String, Vec<String>> = DEFAULT_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), Vec::new()))
        .collect();
    let mut current: Option<String> = None;
    for line in text.lines() {
        let line = line.trim_end();
        if line.starts_with("## ") {
            current = Some(line.to_string());
            categories.entry(line.to_string()).or_default();
        } else if line.starts_with("* [") {
            if let Some(category) = &current {
                categories
                    .entry(category.clone())
                    .or_default()
                    .push(line.to_string());
            }
        }
    }
    categories
}
