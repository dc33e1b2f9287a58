//! Page ingestion for lcagraph
//!
//! Extracts dependency knowledge from a corpus of LCA wiki pages:
//! - product pages (`pd_*.md`) and process pages (`ps_*.md`)
//! - section-scoped markdown bullets carrying typed exchange links
//! - `Quantity:` / `Database:` trailing fields on each exchange
//!
//! Output:
//! - a [`Page`] per file with its outbound [`Edge`] list
//! - a [`PageIndex`] mapping entity ids to pages plus inbound edges
//!
//! Parsing is intentionally forgiving: a page that cannot be read
//! contributes no edges but is still indexed as present, and malformed
//! quantity text degrades to `None` instead of rejecting the edge.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod dblist;
pub mod dokuwiki;
pub mod index;
pub mod markup;
pub mod parser;

pub use index::{resolve_root, PageIndex, RootNotFound};
pub use parser::parse_page;

/// File extension (without dot) that marks a file as a page.
pub const PAGE_EXTENSION: &str = "md";

// ============================================================================
// Entity and relation vocabulary
// ============================================================================

/// Classification of an entity, inferred from its id prefix.
///
/// The check is case-sensitive on the literal prefix: a page named
/// `PD_Foo.md` is accepted by the corpus scan but classified `Unknown`.
/// This mirrors the legacy corpus behavior and is deliberately preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Process,
    Unknown,
}

impl EntityKind {
    pub fn from_id(id: &str) -> Self {
        if id.starts_with("pd_") {
            Self::Product
        } else if id.starts_with("ps_") {
            Self::Process
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Process => "process",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of relations an edge can carry.
///
/// The string forms are stable; they appear verbatim in diagram labels and
/// JSON exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Produces,
    ProducedBy,
    Consumes,
    ConsumesProduct,
    ConsumesProcess,
    References,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produces => "produces",
            Self::ProducedBy => "produced_by",
            Self::Consumes => "consumes",
            Self::ConsumesProduct => "consumes_product",
            Self::ConsumesProcess => "consumes_process",
            Self::References => "references",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Edges and pages
// ============================================================================

/// A directed relation discovered inside a source page.
///
/// Edges are not deduplicated at parse time; the same textual edge may
/// appear verbatim in multiple pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub source_kind: EntityKind,
    pub target_kind: EntityKind,
    pub relation: Relation,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub database: Option<String>,
    /// Original bullet line, kept for diagnostics.
    pub raw_line: String,
}

/// A parsed page: identity, title, and outbound edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub kind: EntityKind,
    pub title: String,
    /// Absent for synthetic entities that are referenced only by name.
    pub source_path: Option<PathBuf>,
    pub edges_out: Vec<Edge>,
}

// ============================================================================
// Link target normalization
// ============================================================================

/// Normalize a markdown link target to an entity id.
///
/// Accepts `pd_x`, `pd_x.md`, `product/pd_x.md`, with `#anchor` or `?query`
/// suffixes removed. Returns an empty string when nothing remains.
pub fn normalize_link_target(target: &str) -> String {
    let t = target.trim();
    let t = t.split(['#', '?']).next().unwrap_or(t);
    let base = t
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .last()
        .unwrap_or("");
    if base.to_lowercase().ends_with(".md") {
        base[..base.len() - 3].to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_inference_follows_literal_prefix() {
        assert_eq!(EntityKind::from_id("pd_widget"), EntityKind::Product);
        assert_eq!(EntityKind::from_id("ps_make_widget"), EntityKind::Process);
        assert_eq!(EntityKind::from_id("bp_emission"), EntityKind::Unknown);
        // Case-sensitive on purpose: see the EntityKind docs.
        assert_eq!(EntityKind::from_id("PD_widget"), EntityKind::Unknown);
    }

    #[test]
    fn normalize_handles_all_target_forms() {
        for target in [
            "pd_x",
            "pd_x.md",
            "product/pd_x.md",
            "pd_x.md#frag",
            "pd_x.md?q=1",
            "  pd_x.md  ",
            "a/b/pd_x.MD",
        ] {
            assert_eq!(normalize_link_target(target), "pd_x", "target: {target}");
        }
        assert_eq!(normalize_link_target("product/"), "");
    }

    #[test]
    fn relation_strings_are_stable() {
        assert_eq!(Relation::ConsumesProduct.as_str(), "consumes_product");
        assert_eq!(Relation::ProducedBy.to_string(), "produced_by");
    }
}
