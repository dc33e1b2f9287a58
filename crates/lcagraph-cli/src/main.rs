//! lcagraph CLI
//!
//! Unified command-line interface for:
//! - Building dependency trees from an LCA page corpus (`tree`)
//! - Extracting and naming root→target traversals (`route`)
//! - Maintaining the `pd_db.md`/`ps_db.md` category lists (`db update`)
//! - Converting legacy DokuWiki pages to markdown (`convert`)

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use lcagraph_pages::{dblist, dokuwiki, resolve_root, PageIndex};
use lcagraph_tree::{build_tree, collect_edges, route_to, BuildOptions};

mod config;
mod export;
mod viz;

use config::RunConfig;

#[derive(Parser)]
#[command(name = "lcagraph")]
#[command(
    author,
    version,
    about = "Dependency graphs for LCA product/process knowledge bases"
)]
struct Cli {
    /// Debug-level diagnostics on stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a corpus, build a dependency tree, and write diagram outputs.
    Tree(TreeArgs),

    /// Report the path from a root to a (product, process) pair and its
    /// synthetic route name.
    Route(RouteArgs),

    /// Database-list maintenance (`pd_db.md` / `ps_db.md`).
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Convert DokuWiki `.txt` pages into markdown pages.
    Convert {
        /// Directory of DokuWiki pages
        input: PathBuf,
        /// Output directory for converted markdown
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// Root page path (corpus-relative) or entity id
    root: String,

    /// Corpus directory to scan
    #[arg(long, default_value = ".")]
    corpus: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "out_tree")]
    out_dir: PathBuf,

    /// Surface processes producing a product as reverse children
    #[arg(long)]
    reverse_producers: bool,

    /// Recursion depth cap, root at depth 0 (0 = unbounded)
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Also write a Graphviz DOT diagram
    #[arg(long)]
    dot: bool,

    /// Also write JSON exports of the tree and its flat edge list
    #[arg(long)]
    json: bool,

    /// Attempt SVG/PNG export via Mermaid CLI and converter probes
    #[arg(long)]
    export_image: bool,

    /// Explicit path to the Mermaid CLI binary (default: search PATH)
    #[arg(long)]
    mmdc_path: Option<PathBuf>,
}

#[derive(Args)]
struct RouteArgs {
    /// Root page path (corpus-relative) or entity id
    root: String,

    /// Corpus directory to scan
    #[arg(long, default_value = ".")]
    corpus: PathBuf,

    /// Product id of the target pair
    #[arg(long)]
    product: String,

    /// Process id of the target pair
    #[arg(long)]
    process: String,

    /// Surface processes producing a product as reverse children
    #[arg(long)]
    reverse_producers: bool,

    /// Recursion depth cap, root at depth 0 (0 = unbounded)
    #[arg(long, default_value_t = 10)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Append unreferenced pages to the `To be classified` sections.
    Update {
        /// Wiki root containing `product/`, `process/` and the db lists
        #[arg(default_value = ".")]
        wiki_root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Tree(args) => {
            let config = RunConfig {
                root: args.root.clone(),
                corpus_root: args.corpus.clone(),
                out_dir: args.out_dir.clone(),
                include_reverse_producers: args.reverse_producers,
                max_depth: depth_cap(args.max_depth),
                verbose: cli.verbose,
                export_image: args.export_image,
                tool_path: args.mmdc_path.clone(),
            };
            cmd_tree(&config, args.dot, args.json)?;
        }
        Commands::Route(args) => cmd_route(&args)?,
        Commands::Db { command } => match command {
            DbCommands::Update { wiki_root } => cmd_db_update(&wiki_root)?,
        },
        Commands::Convert { input, out } => cmd_convert(&input, &out)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn depth_cap(max_depth: usize) -> Option<usize> {
    if max_depth == 0 {
        None
    } else {
        Some(max_depth)
    }
}

/// Resolve the root or report the failure with suggestions; resolution
/// failure is the one fatal user error of a run.
fn resolve_or_report(index: &mut PageIndex, corpus_root: &Path, spec: &str) -> Result<String> {
    match resolve_root(index, corpus_root, spec) {
        Ok(id) => Ok(id),
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            if err.suggestions.is_empty() {
                eprintln!("no close matches found");
            } else {
                eprintln!("close matches: {}", err.suggestions.join(", "));
            }
            Err(err.into())
        }
    }
}

fn cmd_tree(config: &RunConfig, emit_dot: bool, emit_json: bool) -> Result<()> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed to create {}", config.out_dir.display()))?;

    if config.verbose {
        println!(
            "{} corpus={} out={} reverse_producers={} max_depth={:?}",
            "config".cyan().bold(),
            config.corpus_root.display(),
            config.out_dir.display(),
            config.include_reverse_producers,
            config.max_depth,
        );
    }

    let mut index = PageIndex::scan(&config.corpus_root)?;
    println!(
        "{} {} pages (products: {}, processes: {})",
        "indexed".green().bold(),
        index.len(),
        index.product_count(),
        index.process_count()
    );

    let root_id = resolve_or_report(&mut index, &config.corpus_root, &config.root)?;
    println!("{} {root_id}", "root".green().bold());

    let options = BuildOptions {
        include_reverse_producers: config.include_reverse_producers,
        max_depth: config.max_depth,
    };
    let tree = build_tree(&root_id, &index, &options);

    let mermaid = viz::render_mermaid(&tree, &index);
    let mmd_path = config.out_dir.join(format!("graph_{root_id}.mmd"));
    fs::write(&mmd_path, &mermaid)
        .with_context(|| format!("failed to write {}", mmd_path.display()))?;
    println!(
        "{} {}",
        "wrote".green().bold(),
        mmd_path.display().to_string().bold()
    );

    if emit_dot {
        let dot = viz::render_dot(&tree, &index);
        let dot_path = config.out_dir.join(format!("graph_{root_id}.dot"));
        fs::write(&dot_path, dot)
            .with_context(|| format!("failed to write {}", dot_path.display()))?;
        println!(
            "{} {}",
            "wrote".green().bold(),
            dot_path.display().to_string().bold()
        );
    }

    if emit_json {
        let tree_path = config.out_dir.join(format!("tree_{root_id}.json"));
        fs::write(&tree_path, serde_json::to_string_pretty(&tree)?)
            .with_context(|| format!("failed to write {}", tree_path.display()))?;
        let edges_path = config.out_dir.join(format!("edges_{root_id}.json"));
        fs::write(&edges_path, serde_json::to_string_pretty(&collect_edges(&tree))?)
            .with_context(|| format!("failed to write {}", edges_path.display()))?;
        println!(
            "{} {} and {}",
            "wrote".green().bold(),
            tree_path.display().to_string().bold(),
            edges_path.display().to_string().bold()
        );
    }

    write_summary(config, &root_id, &index)?;

    if config.export_image {
        // Best-effort: the text diagram above is already on disk either way.
        export::export_image(&mmd_path, &config.out_dir, &root_id, config.tool_path.as_deref());
    }

    Ok(())
}

fn write_summary(config: &RunConfig, root_id: &str, index: &PageIndex) -> Result<()> {
    let script_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let summary = [
        ("script_dir", script_dir),
        ("repo_root", config.corpus_root.display().to_string()),
        ("cwd", cwd),
        ("root_id", root_id.to_string()),
        ("nodes_indexed", index.len().to_string()),
        ("products_found", index.product_count().to_string()),
        ("processes_found", index.process_count().to_string()),
    ];
    let text: String = summary
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    let log_path = config.out_dir.join(format!("log_{root_id}.txt"));
    fs::write(&log_path, text)
        .with_context(|| format!("failed to write {}", log_path.display()))?;
    println!(
        "{} {}",
        "wrote".green().bold(),
        log_path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_route(args: &RouteArgs) -> Result<()> {
    let mut index = PageIndex::scan(&args.corpus)?;
    let root_id = resolve_or_report(&mut index, &args.corpus, &args.root)?;

    let options = BuildOptions {
        include_reverse_producers: args.reverse_producers,
        max_depth: depth_cap(args.max_depth),
    };
    let tree = build_tree(&root_id, &index, &options);

    let route = route_to(&tree, &args.product, &args.process);
    println!("{} {}", "route".green().bold(), route.name.bold());
    match &route.path {
        Some(path) => println!("{}", path.join(" -> ")),
        None => println!(
            "{} no path from {root_id} to {} / {}",
            "note:".yellow().bold(),
            args.product,
            args.process
        ),
    }
    Ok(())
}

fn cmd_db_update(wiki_root: &Path) -> Result<()> {
    for (folder_name, db_name) in [("product", "pd_db.md"), ("process", "ps_db.md")] {
        let folder = wiki_root.join(folder_name);
        if !folder.is_dir() {
            eprintln!(
                "{} missing folder {}, skipping {db_name}",
                "warning:".yellow().bold(),
                folder.display()
            );
            continue;
        }
        let db_path = wiki_root.join(db_name);
        let report = dblist::update_db_list(&folder, &db_path)?;
        println!(
            "{} {} ({} new, {} total)",
            "updated".green().bold(),
            db_path.display().to_string().bold(),
            report.added,
            report.total
        );
    }
    Ok(())
}

fn cmd_convert(input: &Path, out: &Path) -> Result<()> {
    let converted = dokuwiki::convert_directory(input, out)?;
    println!(
        "{} {converted} pages into {}",
        "converted".green().bold(),
        out.display().to_string().bold()
    );
    Ok(())
}
