//! Section-context page parser.
//!
//! A page is scanned line by line through a small state machine:
//! - `## ` headings select the current second-level section (lowercased),
//! - `### ` headings select the third level,
//! - inside a technosphere `Consumption` section, bare `Product:` /
//!   `Process:` lines toggle the consumption sub-category.
//!
//! Only bulleted lines (`* ` or `- `) yield edges. The relation of each
//! edge is inferred from the surrounding section context; trailing
//! `Quantity:` / `Database:` fields are parsed best-effort.

use regex::Regex;
use std::path::PathBuf;

use crate::{normalize_link_target, Edge, EntityKind, Page, Relation};

/// Consumption sub-category inside a technosphere section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subcategory {
    Product,
    Process,
}

/// Parse one page into its title and outbound edges.
///
/// `id` is the filename stem; it doubles as the fallback title.
pub fn parse_page(text: &str, id: &str, source_path: Option<PathBuf>) -> Page {
    let link_re = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    let typed_title_re = Regex::new(r"(?i)^\s*#+\s+(Process|Product)\s*:").unwrap();
    let subcat_product_re = Regex::new(r"(?i)^\s*product\s*:").unwrap();
    let subcat_process_re = Regex::new(r"(?i)^\s*process\s*:").unwrap();

    let kind = EntityKind::from_id(id);

    let mut title = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("# ") {
            title = Some(rest.trim().to_string());
            break;
        }
        if typed_title_re.is_match(line) {
            title = Some(line.trim_start().trim_start_matches('#').trim().to_string());
            break;
        }
    }
    let title = title.unwrap_or_else(|| id.to_string());

    let mut edges_out = Vec::new();
    let mut current_h2: Option<String> = None;
    let mut current_h3: Option<String> = None;
    let mut consumption_subcat: Option<Subcategory> = None;
    let mut chimaera_mode = false;

    for raw_line in text.lines() {
        let stripped = raw_line.trim();

        // Headings
        if let Some(rest) = stripped.strip_prefix("## ") {
            let h2 = rest.trim().to_lowercase();
            chimaera_mode = h2.contains("chimaera");
            current_h2 = Some(h2);
            current_h3 = None;
            consumption_subcat = None;
            continue;
        }
        if let Some(rest) = stripped.strip_prefix("### ") {
            let h3 = rest.trim().to_lowercase();
            if h3 == "production" || h3 == "consumption" {
                chimaera_mode = false;
            }
            current_h3 = Some(h3);
            consumption_subcat = None;
            continue;
        }

        // Inside Consumption, detect Product:/Process: sub-sections
        let in_technosphere = current_h2
            .as_deref()
            .map(|h2| h2.contains("technosphere"))
            .unwrap_or(false);
        if in_technosphere && current_h3.as_deref() == Some("consumption") {
            if subcat_product_re.is_match(stripped) {
                consumption_subcat = Some(Subcategory::Product);
                continue;
            }
            if subcat_process_re.is_match(stripped) {
                consumption_subcat = Some(Subcategory::Process);
                continue;
            }
        }

        let in_process_list =
            current_h2.as_deref() == Some("list of processes") && kind == EntityKind::Product;
        let is_bullet = stripped.starts_with("* ") || stripped.starts_with("- ");

        // A product's process list accepts bullets without a markup link;
        // such entries synthesize a process id from the label.
        if in_process_list && is_bullet && !link_re.is_match(stripped) {
            let label = stripped[2..].trim();
            let pseudo_id = extract_process_id(label).unwrap_or_else(|| slugify_process_label(label));
            edges_out.push(Edge {
                source: id.to_string(),
                target: pseudo_id,
                source_kind: kind,
                target_kind: EntityKind::Process,
                relation: Relation::ProducedBy,
                quantity: None,
                unit: None,
                database: None,
                raw_line: stripped.to_string(),
            });
        }

        if !is_bullet {
            continue;
        }
        let Some(caps) = link_re.captures(stripped) else {
            continue;
        };
        let target_raw = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();
        let target = normalize_link_target(target_raw);
        if target.is_empty() {
            continue;
        }

        // Context → relation
        let mut relation = if in_process_list {
            Relation::ProducedBy
        } else {
            Relation::References
        };
        if in_technosphere {
            relation = match (current_h3.as_deref(), consumption_subcat) {
                (Some("production"), _) => Relation::Produces,
                (Some("consumption"), Some(Subcategory::Product)) => Relation::ConsumesProduct,
                (Some("consumption"), Some(Subcategory::Process)) => Relation::ConsumesProcess,
                (Some("consumption"), None) => Relation::Consumes,
                _ => relation,
            };
        } else if chimaera_mode {
            relation = Relation::References;
        }

        let trailing = &stripped[caps.get(0).map(|m| m.end()).unwrap_or(stripped.len())..];
        let (quantity, unit, database) = parse_quantity_fields(trailing);

        let target_kind = EntityKind::from_id(&target);
        edges_out.push(Edge {
            source: id.to_string(),
            target,
            source_kind: kind,
            target_kind,
            relation,
            quantity,
            unit,
            database,
            raw_line: stripped.to_string(),
        });
    }

    Page {
        id: id.to_string(),
        kind,
        title,
        source_path,
        edges_out,
    }
}

/// Pull an explicit `ps_`-prefixed token out of a free-text label.
pub fn extract_process_id(label: &str) -> Option<String> {
    let re = Regex::new(r"\b(ps_[A-Za-z0-9_]+)\b").unwrap();
    re.captures(label).map(|c| c[1].to_string())
}

/// Slugify a free-text label into a synthetic `ps_` id.
pub fn slugify_process_label(label: &str) -> String {
    let slug: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if slug.starts_with("ps_") {
        slug
    } else {
        format!("ps_{slug}")
    }
}

/// Parse `Quantity: <value><unit>` and `Database: <name>` trailing fields.
///
/// Field values run until `-`, `;`, or end of line. A non-numeric quantity
/// yields `None` for both value and unit while preserving a found database.
pub fn parse_quantity_fields(text: &str) -> (Option<f64>, Option<String>, Option<String>) {
    let db_re = Regex::new(r"(?i)Database:\s*([^-;\n]+)").unwrap();
    let qty_re = Regex::new(r"(?i)Quantity:\s*([^-;\n]+)").unwrap();
    let num_re = Regex::new(r"^([+-]?(\d+(\.\d+)?|\.\d+)([eE][+-]?\d+)?)\s*(.*)$").unwrap();

    let database = db_re
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty());

    let Some(qty_caps) = qty_re.captures(text) else {
        return (None, None, database);
    };
    let qty_raw = qty_caps[1].trim().to_string();

    let Some(num_caps) = num_re.captures(&qty_raw) else {
        return (None, None, database);
    };
    let quantity = num_caps[1].parse::<f64>().ok();
    let unit = num_caps
        .get(5)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    (quantity, unit, database)
}
