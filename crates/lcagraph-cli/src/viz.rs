//! Diagram rendering for built trees.
//!
//! This module intentionally lives in the CLI crate: it is tooling, it
//! should not bloat the core tree crate, and the dialects it emits can
//! evolve without touching build semantics.
//!
//! Output formats:
//! - Mermaid flowchart (sanitized ids/labels, de-HTML'd arrows)
//! - Graphviz DOT (best-in-class layout, external tooling)
//! - JSON (via serde on the tree itself; handled by the caller)

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use lcagraph_pages::{EntityKind, PageIndex, Relation};
use lcagraph_tree::{collect_edges, ChildEdge, TreeNode};

const MAX_NODE_LABEL: usize = 30;
const MAX_EDGE_LABEL: usize = 80;

/// Mermaid node ids must be safe tokens: keep `[A-Za-z0-9_]`, prefix ids
/// that would start with a digit.
fn sanitize_node_id(s: &str) -> String {
    let id: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        format!("n_{id}")
    } else {
        id
    }
}

/// Make label text Mermaid-safe: drop structurally significant pipes and
/// brackets, collapse whitespace, cap the length.
fn sanitize_label(text: &str) -> String {
    let mut t = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' => t.push('/'),
            '[' | ']' | '(' | ')' => {}
            c if c.is_whitespace() => t.push(' '),
            c => t.push(c),
        }
    }
    let collapsed = t.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_label(&collapsed, MAX_EDGE_LABEL)
}

fn truncate_label(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let cut: String = text.chars().take(max_len - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn esc_quotes(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// Decode the HTML entities some markdown pipelines leave behind; the
/// diagram syntax needs literal arrow characters.
fn decode_entities(s: &str) -> String {
    s.replace("&gt;", ">").replace("&lt;", "<").replace("&amp;", "&")
}

/// Strip a leading `Product:`/`Process:` display prefix, with its
/// punctuation variants (`:`, `-`, `—`, `–`).
fn strip_kind_prefix(title: &str) -> String {
    let re = Regex::new(r"(?i)^\s*(product|process)\s*[:\-—–]\s*").unwrap();
    re.replace(title, "").trim().to_string()
}

// ============================================================================
// Mermaid
// ============================================================================

struct MermaidWalk<'a> {
    index: &'a PageIndex,
    lines: Vec<String>,
    seen_nodes: BTreeSet<String>,
    seen_edges: BTreeSet<(String, String, &'static str)>,
    node_classes: BTreeMap<String, &'static str>,
}

impl<'a> MermaidWalk<'a> {
    fn add_node(&mut self, node_id: &str) {
        // Synthetic route-name nodes are bookkeeping, never drawn.
        if node_id.starts_with("rn_") {
            return;
        }
        if !self.seen_nodes.insert(node_id.to_string()) {
            return;
        }

        let (title, kind) = match self.index.get(node_id) {
            Some(page) => (page.title.clone(), page.kind),
            None => (node_id.to_string(), EntityKind::from_id(node_id)),
        };
        let display = truncate_label(&strip_kind_prefix(&title), MAX_NODE_LABEL);
        let label = esc_quotes(&format!("{display}\\n({kind})"));
        let nid = sanitize_node_id(node_id);
        self.lines.push(format!("  {nid}[\"{label}\"]"));

        let class = match kind {
            EntityKind::Product => {
                let producer_count = self
                    .index
                    .inbound(node_id)
                    .iter()
                    .filter(|e| e.relation == Relation::Produces)
                    .count();
                tracing::debug!(id = %node_id, producers = producer_count, "product node");
                if producer_count > 1 {
                    "multi_producer_product"
                } else {
                    "product"
                }
            }
            EntityKind::Process => "process",
            EntityKind::Unknown => "unknown",
        };
        self.node_classes.insert(nid, class);
    }

    fn edge_label(child: &ChildEdge) -> String {
        let relation = sanitize_label(child.relation.as_str());
        let Some(quantity) = child.quantity else {
            return relation;
        };
        let amount = match &child.unit {
            Some(unit) => format!("{quantity} {unit}"),
            None => format!("{quantity}"),
        };
        let amount = sanitize_label(amount.trim());
        if amount.is_empty() {
            relation
        } else {
            format!("{relation}\\n{amount}")
        }
    }

    fn walk(&mut self, node: &TreeNode) {
        self.add_node(&node.info().id);
        for child in node.children() {
            self.add_node(&child.source);
            self.add_node(&child.target);

            let drawable =
                !child.source.starts_with("rn_") && !child.target.starts_with("rn_");
            if drawable {
                let src = sanitize_node_id(&child.source);
                let tgt = sanitize_node_id(&child.target);
                let key = (src.clone(), tgt.clone(), child.relation.as_str());
                if self.seen_edges.insert(key) {
                    let label = esc_quotes(&Self::edge_label(child));
                    self.lines.push(format!("  {src} -->|{label}| {tgt}"));
                }
            }

            self.walk(&child.child);
        }
    }
}

/// Render a Mermaid flowchart for the tree.
///
/// Nodes are emitted once per unique id in depth-first order; edges once
/// per (source, target, relation) triple across the whole walk, which
/// also absorbs same-relation duplicates the builder deliberately keeps.
pub fn render_mermaid(tree: &TreeNode, index: &PageIndex) -> String {
    let mut walk = MermaidWalk {
        index,
        lines: Vec::new(),
        seen_nodes: BTreeSet::new(),
        seen_edges: BTreeSet::new(),
        node_classes: BTreeMap::new(),
    };

    // Avoid HTML label quirks in some renderers.
    walk.lines
        .push("%%{init: {'flowchart': {'htmlLabels': false}} }%%".to_string());
    walk.lines.push("graph TD".to_string());
    walk.lines.extend(
        [
            "  classDef product fill:#e8f5e9,stroke:#2e7d32,color:#1b5e20,stroke-width:1px;",
            "  classDef process fill:#e3f2fd,stroke:#1565c0,color:#0d47a1,stroke-width:1px;",
            "  classDef unknown fill:#fff3e0,stroke:#ef6c00,color:#e65100,stroke-width:1px;",
            "  classDef multi_producer_product fill:#ffebee,stroke:#c62828,color:#b71c1c,stroke-width:2px;",
        ]
        .map(String::from),
    );

    walk.walk(tree);

    let classes: Vec<String> = walk
        .node_classes
        .iter()
        .map(|(nid, class)| format!("  class {nid} {class};"))
        .collect();
    walk.lines.extend(classes);

    decode_entities(&walk.lines.join("\n"))
}

// ============================================================================
// Graphviz DOT
// ============================================================================

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render Graphviz DOT for the reachable subgraph of the tree.
pub fn render_dot(tree: &TreeNode, index: &PageIndex) -> String {
    let edges: Vec<_> = collect_edges(tree)
        .into_iter()
        .filter(|e| !e.source.starts_with("rn_") && !e.target.starts_with("rn_"))
        .collect();

    let mut out = Vec::new();
    out.push("digraph lcagraph {".to_string());
    out.push("  rankdir=LR;".to_string());
    out.push("  node [shape=box, style=rounded, fontsize=10];".to_string());

    let mut nodes: BTreeSet<&str> = BTreeSet::new();
    for edge in &edges {
        nodes.insert(&edge.source);
        nodes.insert(&edge.target);
    }

    for node_id in nodes {
        let (title, kind) = match index.get(node_id) {
            Some(page) => (page.title.clone(), page.kind),
            None => (node_id.to_string(), EntityKind::from_id(node_id)),
        };
        // Escape before adding the `\n` separator so it reaches Graphviz
        // as a line break rather than an escaped backslash.
        let label = format!(
            "{}\\n({kind})",
            dot_escape(&truncate_label(&title, MAX_NODE_LABEL))
        );
        let (shape, fillcolor, color) = match kind {
            EntityKind::Product => ("oval", "#e8f5e9", "#2e7d32"),
            EntityKind::Process => ("box", "#e3f2fd", "#1565c0"),
            EntityKind::Unknown => ("box", "#fff3e0", "#ef6c00"),
        };
        out.push(format!(
            "  \"{}\" [label=\"{label}\", shape={shape}, style=\"filled,rounded\", fillcolor=\"{fillcolor}\", color=\"{color}\"];",
            dot_escape(node_id),
        ));
    }

    for edge in &edges {
        let mut label = edge.relation.to_string();
        if let Some(quantity) = edge.quantity {
            match &edge.unit {
                Some(unit) => label = format!("{label} ({quantity} {unit})"),
                None => label = format!("{label} ({quantity})"),
            }
        }
        out.push(format!(
            "  \"{}\" -> \"{}\" [label=\"{}\", fontsize=9];",
            dot_escape(&edge.source),
            dot_escape(&edge.target),
            dot_escape(&label),
        ));
    }

    out.push("}".to_string());
    out.join("\n")
}
