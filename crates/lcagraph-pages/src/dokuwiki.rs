//! DokuWiki → GitHub-wiki markdown conversion.
//!
//! Legacy corpora were authored in DokuWiki markup (`**Title**`,
//! `__Section__`, `[[namespace:page]]` links). This module converts those
//! pages into the markdown dialect the parser reads. Two layouts are
//! handled:
//! - regular entity pages,
//! - database index pages (sections written as `Category:` lines with
//!   `*[[page]]` bullets).

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Convert one DokuWiki page, dispatching on its layout.
pub fn convert_page(content: &str) -> String {
    if is_database_index(content) {
        convert_database_index(content)
    } else {
        convert_entity_page(content)
    }
}

/// A database index starts with a bare `Category:` line within the first
/// few lines (as opposed to bold markup).
fn is_database_index(content: &str) -> bool {
    content
        .lines()
        .take(3)
        .any(|line| line.trim().ends_with(':') && !line.starts_with("**"))
}

fn convert_database_index(content: &str) -> String {
    let simple_link_re = Regex::new(r"\*\[\[([^\]]+)\]\]").unwrap();
    let mut out: Vec<String> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.ends_with(':') {
            let section = trimmed.trim_end_matches(':').trim();
            out.push(format!("\n## {section}\n"));
            continue;
        }
        if trimmed.starts_with("*[[") {
            if let Some(caps) = simple_link_re.captures(trimmed) {
                let page = &caps[1];
                out.push(format!("* [{page}]({page})"));
                continue;
            }
        }
        if !trimmed.is_empty() {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}

fn convert_entity_page(content: &str) -> String {
    let link_re = Regex::new(r"\[\[([^:]+):([^\]]+)\]\](.*)").unwrap();
    let mut lines = content.lines();
    let mut out: Vec<String> = Vec::new();

    // Bold first line is the page title.
    let mut first = lines.next();
    if let Some(line) = first {
        if line.starts_with("**") {
            let title = line.trim_matches('*').trim();
            out.push(format!("# {title}\n"));
            first = None;
        }
    }

    for line in first.into_iter().chain(lines) {
        if line.starts_with("__") && line.ends_with("__") && line.len() > 4 {
            let section = line.trim_matches('_').trim();
            out.push(format!("\n## {section}\n"));
            continue;
        }
        if line.starts_with("**") && line.ends_with("**") && line.len() > 4 {
            let subsection = line.trim_matches('*').trim();
            out.push(format!("\n### {subsection}\n"));
            continue;
        }
        if line.contains("[[") && line.contains("]]") && line.trim().starts_with('*') {
            if let Some(caps) = link_re.captures(line) {
                let page = caps[2].trim().replace(' ', "_");
                let metadata = &caps[3];
                out.push(format!("* [{page}]({page}){metadata}"));
                continue;
            }
        }
        out.push(line.to_string());
    }

    out.join("\n")
}

/// Convert every `.txt` page under `input` into a `.md` sibling under
/// `output`. Returns the number of pages converted; individual failures
/// are logged and skipped.
pub fn convert_directory(input: &Path, output: &Path) -> Result<usize> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut converted = 0;
    let entries = std::fs::read_dir(input)
        .with_context(|| format!("failed to list {}", input.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_txt = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_txt {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable page");
                continue;
            }
        };
        let markdown = convert_page(&content);
        let out_path = output.join(format!("{stem}.md"));
        std::fs::write(&out_path, markdown)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        converted += 1;
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_page_conversion() {
        let doku = "\
**Process: make widget**
__Technosphere Flow__
**Production**
* [[product:pd widget]] - Quantity: 1 unit
plain text stays
";
        let md = convert_page(doku);
        assert!(md.contains("# Process: make widget"));
        assert!(md.contains("\n## Technosphere Flow\n"));
        assert!(md.contains("\n### Production\n"));
        assert!(md.contains("* [pd_widget](pd_widget) - Quantity: 1 unit"));
        assert!(md.contains("plain text stays"));
    }

    #[test]
    fn database_index_conversion() {
        let doku = "\
Upstream:
*[[pd_steel]]
*[[ps_smelting]]
";
        let md = convert_page(doku);
        assert!(md.contains("## Upstream"));
        assert!(md.contains("* [pd_steel](pd_steel)"));
        assert!(md.contains("* [ps_smelting](ps_smelting)"));
    }

    #[test]
    fn converted_page_feeds_the_parser() {
        let doku = "\
**Product: widget**
__List of processes__
* [[process:ps make widget]] - Quantity: 5 kg - Database: ecoinvent
";
        let md = convert_page(doku);
        let page = crate::parse_page(&md, "pd_widget", None);
        assert_eq!(page.edges_out.len(), 1);
        assert_eq!(page.edges_out[0].target, "ps_make_widget");
        assert_eq!(page.edges_out[0].quantity, Some(5.0));
    }

    #[test]
    fn directory_conversion_writes_md_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("pd_widget.txt"), "**Product: widget**\n").unwrap();
        std::fs::write(input.join("ignored.csv"), "a,b\n").unwrap();

        let converted = convert_directory(&input, &output).unwrap();
        assert_eq!(converted, 1);
        let md = std::fs::read_to_string(output.join("pd_widget.md")).unwrap();
        assert!(md.starts_with("# Product: widget"));
    }
}
