//! End-to-end tests driving the `lcagraph` binary against a temp corpus.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn lcagraph_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lcagraph"))
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_corpus(dir: &Path) {
    write(
        dir,
        "product/pd_widget.md",
        "# Product: Widget\n\n## List of processes\n\n\
         * [ps_make_widget](ps_make_widget.md) - Quantity: 5 kg - Database: ecoinvent\n",
    );
    write(
        dir,
        "process/ps_make_widget.md",
        "# Process: Make widget\n\n## Technosphere Flow\n\n### Production\n\n\
         * [pd_widget](pd_widget.md) - Quantity: 5 kg\n\n### Consumption\n\n\
         Product:\n\n* [pd_steel](pd_steel.md) - Quantity: 2 kg\n",
    );
    write(dir, "product/pd_steel.md", "# Product: Steel\n");
}

#[test]
fn tree_command_writes_diagram_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    sample_corpus(dir.path());
    let out_dir = dir.path().join("out");

    let output = Command::new(lcagraph_bin())
        .arg("tree")
        .arg("pd_widget")
        .arg("--corpus")
        .arg(dir.path())
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--reverse-producers")
        .arg("--dot")
        .arg("--json")
        .output()
        .expect("run lcagraph tree");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let mermaid = fs::read_to_string(out_dir.join("graph_pd_widget.mmd")).unwrap();
    assert!(mermaid.contains("graph TD"));
    assert!(mermaid.contains("pd_widget"));
    assert!(mermaid.contains("ps_make_widget"));
    // The produces/produced_by pair survives as a single produces edge.
    assert_eq!(mermaid.matches("-->|produces").count(), 1);

    let dot = fs::read_to_string(out_dir.join("graph_pd_widget.dot")).unwrap();
    assert!(dot.contains("digraph"));

    let tree_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("tree_pd_widget.json")).unwrap())
            .unwrap();
    assert_eq!(tree_json["id"], "pd_widget");
    assert_eq!(tree_json["node"], "expanded");

    let summary = fs::read_to_string(out_dir.join("log_pd_widget.txt")).unwrap();
    assert!(summary.contains("root_id: pd_widget"));
    assert!(summary.contains("nodes_indexed: 3"));
    assert!(summary.contains("products_found: 2"));
    assert!(summary.contains("processes_found: 1"));
}

#[test]
fn tree_command_accepts_relative_page_path() {
    let dir = tempfile::tempdir().unwrap();
    sample_corpus(dir.path());
    let out_dir = dir.path().join("out");

    let output = Command::new(lcagraph_bin())
        .arg("tree")
        .arg("product/pd_widget.md")
        .arg("--corpus")
        .arg(dir.path())
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .expect("run lcagraph tree");
    assert!(output.status.success());
    assert!(out_dir.join("graph_pd_widget.mmd").exists());
}

#[test]
fn unresolvable_root_fails_with_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    sample_corpus(dir.path());

    let output = Command::new(lcagraph_bin())
        .arg("tree")
        .arg("widget")
        .arg("--corpus")
        .arg(dir.path())
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .output()
        .expect("run lcagraph tree");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
    assert!(stderr.contains("pd_widget"), "stderr: {stderr}");
}

#[test]
fn route_command_reports_path_and_name() {
    let dir = tempfile::tempdir().unwrap();
    sample_corpus(dir.path());

    let output = Command::new(lcagraph_bin())
        .arg("route")
        .arg("pd_widget")
        .arg("--corpus")
        .arg(dir.path())
        .arg("--product")
        .arg("pd_steel")
        .arg("--process")
        .arg("ps_make_widget")
        .output()
        .expect("run lcagraph route");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rn_pd_steel_ps_make_widget"));
    assert!(stdout.contains("pd_widget -> ps_make_widget"));
}

#[test]
fn db_update_command_classifies_new_pages() {
    let dir = tempfile::tempdir().unwrap();
    sample_corpus(dir.path());

    let output = Command::new(lcagraph_bin())
        .arg("db")
        .arg("update")
        .arg(dir.path())
        .output()
        .expect("run lcagraph db update");
    assert!(output.status.success());

    let pd_db = fs::read_to_string(dir.path().join("pd_db.md")).unwrap();
    assert!(pd_db.contains("* [pd_widget](pd_widget)"));
    assert!(pd_db.contains("* [pd_steel](pd_steel)"));
    let ps_db = fs::read_to_string(dir.path().join("ps_db.md")).unwrap();
    assert!(ps_db.contains("* [ps_make_widget](ps_make_widget)"));
}

#[test]
fn convert_command_translates_dokuwiki_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doku");
    fs::create_dir_all(&input).unwrap();
    fs::write(
        input.join("pd_widget.txt"),
        "**Product: widget**\n__List of processes__\n* [[process:ps make widget]] - Quantity: 5 kg\n",
    )
    .unwrap();
    let out = dir.path().join("md");

    let output = Command::new(lcagraph_bin())
        .arg("convert")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run lcagraph convert");
    assert!(output.status.success());

    let converted = fs::read_to_string(out.join("pd_widget.md")).unwrap();
    assert!(converted.contains("# Product: widget"));
    assert!(converted.contains("* [ps_make_widget](ps_make_widget) - Quantity: 5 kg"));
}
