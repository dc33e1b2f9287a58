//! Run configuration.
//!
//! All knobs of a tree run travel in one explicit value; there is no
//! global mutable configuration. Defaults mirror the conventional corpus
//! layout (current directory, `out_tree/` output, depth cap of 10).

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root specification: a page path or an entity id (see root
    /// resolution in `lcagraph_pages::index`).
    pub root: String,
    /// Corpus directory to scan.
    pub corpus_root: PathBuf,
    /// Directory receiving diagram, JSON, and summary outputs.
    pub out_dir: PathBuf,
    /// Surface reverse producers for product nodes.
    pub include_reverse_producers: bool,
    /// Recursion depth cap; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Debug-level diagnostics.
    pub verbose: bool,
    /// Attempt SVG/PNG export through external tools.
    pub export_image: bool,
    /// Explicit Mermaid CLI location; otherwise discovered on PATH.
    pub tool_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            corpus_root: PathBuf::from("."),
            out_dir: PathBuf::from("out_tree"),
            include_reverse_producers: false,
            max_depth: Some(10),
            verbose: false,
            export_image: false,
            tool_path: None,
        }
    }
}
