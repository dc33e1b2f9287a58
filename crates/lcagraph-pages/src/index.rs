//! Corpus scan and repository index.
//!
//! The index maps entity ids to parsed pages and keeps the reverse-edge
//! view: `inbound(n)` is exactly the set of outbound edges across the whole
//! index whose target is `n`. It is built once per run from a full corpus
//! scan and mutated only by inserting on-demand-parsed entities (typically
//! the resolved root).

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{parse_page, Edge, Page, PAGE_EXTENSION};

/// Maximum number of id suggestions reported for an unresolvable root.
const MAX_SUGGESTIONS: usize = 12;

/// Id → page mapping plus the computed inbound-edge view.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    pages: BTreeMap<String, Page>,
    inbound: BTreeMap<String, Vec<Edge>>,
}

impl PageIndex {
    /// Recursively scan `corpus_root` for `pd_*`/`ps_*` pages
    /// (case-insensitive on both stem prefix and extension).
    ///
    /// The walk is sorted by file name so duplicate stems across folders
    /// shadow deterministically: the first occurrence wins, silently.
    pub fn scan(corpus_root: &Path) -> Result<Self> {
        if !corpus_root.is_dir() {
            return Err(anyhow!(
                "corpus root {} is not a directory",
                corpus_root.display()
            ));
        }

        let mut index = Self::default();

        for entry in WalkDir::new(corpus_root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_page = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case(PAGE_EXTENSION))
                .unwrap_or(false);
            if !is_page {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let lower = stem.to_lowercase();
            if !lower.starts_with("pd_") && !lower.starts_with("ps_") {
                continue;
            }
            if index.pages.contains_key(&stem) {
                tracing::debug!(id = %stem, path = %path.display(), "duplicate stem shadowed");
                continue;
            }
            let page = parse_page_file(path);
            index.pages.insert(page.id.clone(), page);
        }

        index.rebuild_inbound();
        Ok(index)
    }

    /// Insert (or replace) a page and leave the inbound view stale;
    /// callers batch insertions and then [`rebuild_inbound`](Self::rebuild_inbound).
    pub fn insert_page(&mut self, page: Page) {
        self.pages.insert(page.id.clone(), page);
    }

    /// Recompute all inbound lists in a single pass over outbound edges.
    ///
    /// Edges pointing at ids not present in the index are dangling; they
    /// simply do not appear in any inbound list.
    pub fn rebuild_inbound(&mut self) {
        let mut inbound: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        for page in self.pages.values() {
            for edge in &page.edges_out {
                if self.pages.contains_key(&edge.target) {
                    inbound.entry(edge.target.clone()).or_default().push(edge.clone());
                }
            }
        }
        self.inbound = inbound;
    }

    pub fn get(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages.contains_key(id)
    }

    pub fn inbound(&self, id: &str) -> &[Edge] {
        self.inbound.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Count of indexed ids with the literal `pd_` prefix.
    pub fn product_count(&self) -> usize {
        self.pages.keys().filter(|k| k.starts_with("pd_")).count()
    }

    /// Count of indexed ids with the literal `ps_` prefix.
    pub fn process_count(&self) -> usize {
        self.pages.keys().filter(|k| k.starts_with("ps_")).count()
    }

    /// Case-insensitive substring match over indexed ids, sorted,
    /// capped at `limit`.
    pub fn suggest(&self, wanted: &str, limit: usize) -> Vec<String> {
        let needle = wanted.to_lowercase();
        self.pages
            .keys()
            .filter(|id| id.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Parse a page file, degrading unreadable content to an empty parse.
pub fn parse_page_file(path: &Path) -> Page {
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let text = safe_read_text(path);
    parse_page(&text, &id, Some(path.to_path_buf()))
}

/// Read a page, returning an empty string when it cannot be decoded.
/// The page still gets indexed; it just contributes no edges.
pub fn safe_read_text(path: &Path) -> String {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unreadable page, treating as empty");
            return String::new();
        }
    };
    // Drop a UTF-8 BOM so the first heading still matches.
    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        return stripped.to_string();
    }
    text
}

// ============================================================================
// Root resolution
// ============================================================================

/// Fatal resolution failure, carrying best-effort suggestions.
#[derive(Debug, thiserror::Error)]
#[error("root `{wanted}` not found in the scanned corpus (probed {})", probed.display())]
pub struct RootNotFound {
    pub wanted: String,
    pub probed: PathBuf,
    pub suggestions: Vec<String>,
}

/// Resolve a root specification against the index, parsing on demand.
///
/// Accepted forms, in order:
/// 1. an absolute or corpus-relative path ending in the page extension,
/// 2. an id already present in the index,
/// 3. a bare id probed at the conventional `product/<id>.md` location.
///
/// Successful on-demand parses are merged into the index and the inbound
/// view is rebuilt, so the caller sees a consistent index afterwards.
pub fn resolve_root(
    index: &mut PageIndex,
    corpus_root: &Path,
    spec: &str,
) -> Result<String, RootNotFound> {
    let as_path = Path::new(spec);
    let is_page_path = as_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case(PAGE_EXTENSION))
        .unwrap_or(false);

    if is_page_path {
        let candidate = if as_path.is_absolute() {
            as_path.to_path_buf()
        } else {
            corpus_root.join(as_path)
        };
        if candidate.exists() {
            let page = parse_page_file(&candidate);
            let id = page.id.clone();
            index.insert_page(page);
            index.rebuild_inbound();
            return Ok(id);
        }
        tracing::warn!(path = %candidate.display(), "root page path not found, trying id forms");
    }

    if index.contains(spec) {
        return Ok(spec.to_string());
    }

    let probed = corpus_root.join("product").join(format!("{spec}.{PAGE_EXTENSION}"));
    if probed.exists() {
        let page = parse_page_file(&probed);
        let id = page.id.clone();
        index.insert_page(page);
        index.rebuild_inbound();
        return Ok(id);
    }

    Err(RootNotFound {
        wanted: spec.to_string(),
        probed,
        suggestions: index.suggest(spec, MAX_SUGGESTIONS),
    })
}
