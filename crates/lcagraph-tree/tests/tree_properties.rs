//! Property tests for tree construction.
//!
//! Random small corpora are generated directly as pages with edge lists;
//! the built tree must terminate, never repeat an id on a root-to-node
//! path (except as a Cycle terminal), and respect the depth cap.

use proptest::prelude::*;

use lcagraph_pages::{Edge, EntityKind, Page, PageIndex, Relation};
use lcagraph_tree::{build_tree, BuildOptions, TreeNode};

fn node_id(i: usize) -> String {
    if i % 2 == 0 {
        format!("pd_n{i}")
    } else {
        format!("ps_n{i}")
    }
}

fn make_index(node_count: usize, edges: &[(usize, usize, bool)]) -> PageIndex {
    let mut index = PageIndex::default();
    for i in 0..node_count {
        let id = node_id(i);
        let kind = EntityKind::from_id(&id);
        let edges_out = edges
            .iter()
            .filter(|(source, _, _)| *source == i)
            .map(|(source, target, produces)| {
                let source_id = node_id(*source);
                let target_id = node_id(*target % node_count);
                let source_kind = EntityKind::from_id(&source_id);
                let target_kind = EntityKind::from_id(&target_id);
                // A produces edge only makes sense process → product.
                let relation = if *produces
                    && source_kind == EntityKind::Process
                    && target_kind == EntityKind::Product
                {
                    Relation::Produces
                } else {
                    Relation::References
                };
                Edge {
                    source: source_id.clone(),
                    target: target_id,
                    source_kind,
                    target_kind,
                    relation,
                    quantity: None,
                    unit: None,
                    database: None,
                    raw_line: String::new(),
                }
            })
            .collect();
        index.insert_page(Page {
            id: id.clone(),
            kind,
            title: id,
            source_path: None,
            edges_out,
        });
    }
    index.rebuild_inbound();
    index
}

fn check_paths(node: &TreeNode, ancestors: &mut Vec<String>, max_depth: Option<usize>) {
    let id = node.info().id.clone();
    let repeated = ancestors.contains(&id);
    if repeated {
        assert!(
            node.is_cycle(),
            "id {id} repeats on its path without a cycle terminal"
        );
    }
    if node.is_cycle() || node.is_truncated() {
        assert!(node.children().is_empty());
    }
    if let Some(max_depth) = max_depth {
        assert!(
            ancestors.len() <= max_depth,
            "node {id} exceeds the depth cap"
        );
    }
    ancestors.push(id);
    for child in node.children() {
        check_paths(&child.child, ancestors, max_depth);
    }
    ancestors.pop();
}

proptest! {
    #[test]
    fn no_id_repeats_on_any_path(
        node_count in 1usize..7,
        edges in prop::collection::vec((0usize..7, 0usize..7, any::<bool>()), 0..24),
        include_reverse in any::<bool>(),
        max_depth in prop::option::of(0usize..5),
    ) {
        let edges: Vec<(usize, usize, bool)> = edges
            .into_iter()
            .map(|(s, t, p)| (s % node_count, t % node_count, p))
            .collect();
        let index = make_index(node_count, &edges);
        let options = BuildOptions {
            include_reverse_producers: include_reverse,
            max_depth,
        };
        for i in 0..node_count {
            let tree = build_tree(&node_id(i), &index, &options);
            let mut ancestors = Vec::new();
            check_paths(&tree, &mut ancestors, max_depth);
        }
    }

    #[test]
    fn producer_pairs_never_duplicate_among_children(
        node_count in 2usize..7,
        edges in prop::collection::vec((0usize..7, 0usize..7, any::<bool>()), 0..24),
    ) {
        let edges: Vec<(usize, usize, bool)> = edges
            .into_iter()
            .map(|(s, t, p)| (s % node_count, t % node_count, p))
            .collect();
        let index = make_index(node_count, &edges);
        let options = BuildOptions { include_reverse_producers: true, max_depth: Some(4) };
        for i in 0..node_count {
            let tree = build_tree(&node_id(i), &index, &options);
            check_pair_dedup(&tree);
        }
    }
}

fn check_pair_dedup(node: &TreeNode) {
    let mut pairs = std::collections::HashSet::new();
    for child in node.children() {
        if matches!(child.relation, Relation::Produces | Relation::ProducedBy) {
            let mut pair = [child.source.clone(), child.target.clone()];
            pair.sort();
            assert!(
                pairs.insert(pair),
                "duplicate producer pair among children of {}",
                node.info().id
            );
        }
    }
    for child in node.children() {
        check_pair_dedup(&child.child);
    }
}
