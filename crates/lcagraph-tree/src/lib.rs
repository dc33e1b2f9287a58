//! Dependency tree construction for lcagraph.
//!
//! Expands an entity id into a rooted, cycle-safe, depth-bounded tree
//! over a [`PageIndex`](lcagraph_pages::PageIndex), and extracts
//! root→target paths from built trees.

pub mod build;
pub mod path;

pub use build::{build_tree, collect_edges, BuildOptions, ChildEdge, FlatEdge, NodeInfo, TreeNode};
pub use path::{find_path, route_to, Route};
