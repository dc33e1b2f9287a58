//! Root→target path extraction.
//!
//! Used to name exported sub-views: a traversal from a root to a
//! (product, process) pair is identified by the synthetic id
//! `rn_<product>_<process>`. Synthetic `rn_` ids are bookkeeping only and
//! are never rendered.

use std::collections::BTreeSet;

use crate::TreeNode;

/// Depth-first search for the first path (in child-insertion order) from
/// the root to any node whose id is in `targets`. The returned path
/// includes both endpoints.
pub fn find_path(tree: &TreeNode, targets: &BTreeSet<String>) -> Option<Vec<String>> {
    let mut path = Vec::new();
    if dfs(tree, targets, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn dfs(node: &TreeNode, targets: &BTreeSet<String>, path: &mut Vec<String>) -> bool {
    path.push(node.info().id.clone());
    if targets.contains(&node.info().id) {
        return true;
    }
    for child in node.children() {
        if dfs(&child.child, targets, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// A named root→target traversal.
#[derive(Debug, Clone)]
pub struct Route {
    /// Stable synthetic name, `rn_<product>_<process>`; produced even when
    /// no connecting path exists.
    pub name: String,
    /// The discovered path, when one exists.
    pub path: Option<Vec<String>>,
}

/// Locate the (product, process) pair in the tree and name the traversal.
pub fn route_to(tree: &TreeNode, product_id: &str, process_id: &str) -> Route {
    let targets: BTreeSet<String> = [product_id.to_string(), process_id.to_string()].into();
    Route {
        name: format!("rn_{product_id}_{process_id}"),
        path: find_path(tree, &targets),
    }
}
