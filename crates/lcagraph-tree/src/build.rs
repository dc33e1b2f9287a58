//! Recursive tree builder.
//!
//! Expansion of a node is bounded twice:
//! - a node whose id already appears on its own ancestor chain becomes a
//!   `Cycle` terminal,
//! - a node at the configured depth cap becomes a `Truncated` terminal.
//!
//! The ancestor chain is an accumulator passed through the recursion, so
//! the invariant "no id repeats on a root-to-node path" is enforced
//! structurally rather than by call-stack inspection.

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use lcagraph_pages::{Edge, EntityKind, PageIndex, Relation};

/// Options controlling tree expansion.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// For product nodes, surface processes with inbound `produces` edges
    /// as children even when the product page does not link them forward.
    pub include_reverse_producers: bool,
    /// Depth cap; the root is depth 0. `None` means unbounded (termination
    /// then rests on the cycle check and the finite corpus).
    pub max_depth: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_reverse_producers: true,
            max_depth: None,
        }
    }
}

/// Identity shared by every node variant.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub id: String,
    pub kind: EntityKind,
    pub title: String,
    /// Absent for stub nodes synthesized for ids not in the index.
    pub source_path: Option<PathBuf>,
}

/// A node of the built tree.
///
/// Terminal variants carry no children and are mutually exclusive; this
/// keeps the stop conditions exhaustively checkable at match sites.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Expanded {
        #[serde(flatten)]
        info: NodeInfo,
        children: Vec<ChildEdge>,
    },
    /// The id already appears on this node's ancestor chain.
    Cycle {
        #[serde(flatten)]
        info: NodeInfo,
    },
    /// The depth cap was reached before expansion.
    Truncated {
        #[serde(flatten)]
        info: NodeInfo,
    },
}

impl TreeNode {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Self::Expanded { info, .. } | Self::Cycle { info } | Self::Truncated { info } => info,
        }
    }

    pub fn children(&self) -> &[ChildEdge] {
        match self {
            Self::Expanded { children, .. } => children,
            Self::Cycle { .. } | Self::Truncated { .. } => &[],
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// One surviving neighbor edge together with its expanded endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChildEdge {
    pub relation: Relation,
    pub source: String,
    pub target: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub database: Option<String>,
    pub child: TreeNode,
}

/// Expansion direction of a neighbor edge relative to the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// The node is the edge source; recursion continues at the target.
    Forward,
    /// The node is the edge target (reverse producer); recursion
    /// continues at the source.
    Reverse,
}

/// Build a tree rooted at `root_id`.
///
/// Ids absent from the index become stub nodes: kind inferred from the
/// prefix, title equal to the id, no page, no children.
pub fn build_tree(root_id: &str, index: &PageIndex, options: &BuildOptions) -> TreeNode {
    let mut ancestors = Vec::new();
    build_node(root_id, index, options, &mut ancestors)
}

fn node_info(id: &str, index: &PageIndex) -> NodeInfo {
    match index.get(id) {
        Some(page) => NodeInfo {
            id: page.id.clone(),
            kind: page.kind,
            title: page.title.clone(),
            source_path: page.source_path.clone(),
        },
        None => NodeInfo {
            id: id.to_string(),
            kind: EntityKind::from_id(id),
            title: id.to_string(),
            source_path: None,
        },
    }
}

fn build_node(
    root_id: &str,
    index: &PageIndex,
    options: &BuildOptions,
    ancestors: &mut Vec<String>,
) -> TreeNode {
    let info = node_info(root_id, index);

    if ancestors.iter().any(|a| a == root_id) {
        return TreeNode::Cycle { info };
    }
    if let Some(max_depth) = options.max_depth {
        if ancestors.len() >= max_depth {
            return TreeNode::Truncated { info };
        }
    }

    let mut neighbors: Vec<(Edge, Direction)> = Vec::new();
    if let Some(page) = index.get(root_id) {
        for edge in &page.edges_out {
            neighbors.push((edge.clone(), Direction::Forward));
        }
    }
    if options.include_reverse_producers && info.kind == EntityKind::Product {
        for edge in index.inbound(root_id) {
            if edge.relation == Relation::Produces {
                neighbors.push((edge.clone(), Direction::Reverse));
            }
        }
    }

    let neighbors = dedup_producer_pairs(neighbors);

    let mut children = Vec::new();
    for (edge, direction) in neighbors {
        let child_id = match direction {
            Direction::Forward => edge.target.as_str(),
            Direction::Reverse => edge.source.as_str(),
        };
        ancestors.push(root_id.to_string());
        let child = build_node(child_id, index, options, ancestors);
        ancestors.pop();

        children.push(ChildEdge {
            relation: edge.relation,
            source: edge.source,
            target: edge.target,
            quantity: edge.quantity,
            unit: edge.unit,
            database: edge.database,
            child,
        });
    }

    TreeNode::Expanded { info, children }
}

/// Identify the product and process sides of a producer-pair edge,
/// regardless of which side is source or target.
fn producer_pair(edge: &Edge) -> (String, String) {
    let product = if edge.source_kind == EntityKind::Product {
        edge.source.clone()
    } else {
        edge.target.clone()
    };
    let process = if edge.source_kind == EntityKind::Process {
        edge.source.clone()
    } else {
        edge.target.clone()
    };
    (product, process)
}

/// Collapse `{produces, produced_by}` duplicates down to one edge per
/// (product, process) pair, preferring `produces`.
///
/// Other relation kinds are kept as-is: duplicates with identical
/// (target, relation) but different quantities are a corpus signal the
/// renderer may still deduplicate visually, not something to collapse
/// here.
fn dedup_producer_pairs(neighbors: Vec<(Edge, Direction)>) -> Vec<(Edge, Direction)> {
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::new();

    for (edge, direction) in &neighbors {
        if matches!(edge.relation, Relation::Produces | Relation::ProducedBy) {
            let pair = producer_pair(edge);
            if seen_pairs.contains(&pair) {
                continue;
            }
            if edge.relation == Relation::ProducedBy {
                let produces_exists = neighbors.iter().any(|(other, _)| {
                    other.relation == Relation::Produces && producer_pair(other) == pair
                });
                if produces_exists {
                    // The produces edge will represent this pair when the
                    // walk reaches it; leave the pair unmarked until then.
                    continue;
                }
            }
            seen_pairs.insert(pair);
        }
        unique.push((edge.clone(), *direction));
    }

    unique
}

// ============================================================================
// Flat edge collection
// ============================================================================

/// An edge of the built tree, detached from the node structure.
#[derive(Debug, Clone, Serialize)]
pub struct FlatEdge {
    pub relation: Relation,
    pub source: String,
    pub target: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub database: Option<String>,
}

/// Collect every reachable child edge in depth-first walk order.
pub fn collect_edges(tree: &TreeNode) -> Vec<FlatEdge> {
    let mut edges = Vec::new();
    collect_into(tree, &mut edges);
    edges
}

fn collect_into(node: &TreeNode, edges: &mut Vec<FlatEdge>) {
    for child in node.children() {
        edges.push(FlatEdge {
            relation: child.relation,
            source: child.source.clone(),
            target: child.target.clone(),
            quantity: child.quantity,
            unit: child.unit.clone(),
            database: child.database.clone(),
        });
        collect_into(&child.child, edges);
    }
}
