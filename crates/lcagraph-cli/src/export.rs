//! Optional image export through external tools.
//!
//! Two stages, both best-effort and never fatal:
//! 1. Mermaid CLI (`mmdc`) renders the `.mmd` diagram to SVG. The binary
//!    comes from an explicit configured path or a PATH lookup.
//! 2. An ordered list of SVG→PNG converter probes runs; the first
//!    converter found on PATH is used and the chain stops there, whether
//!    or not its invocation succeeds.
//!
//! Failures are logged; the caller keeps the text diagram regardless.

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locate an executable on the search path.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// One capability probe of the SVG→PNG chain.
struct Converter {
    name: &'static str,
    build: fn(&Path, &Path) -> Command,
}

fn rsvg_convert_command(svg: &Path, png: &Path) -> Command {
    let mut cmd = Command::new("rsvg-convert");
    cmd.arg("-o").arg(png).arg(svg);
    cmd
}

fn inkscape_command(svg: &Path, png: &Path) -> Command {
    let mut cmd = Command::new("inkscape");
    cmd.arg(svg)
        .arg("--export-type=png")
        .arg(format!("--export-filename={}", png.display()));
    cmd
}

fn magick_command(svg: &Path, png: &Path) -> Command {
    let mut cmd = Command::new("magick");
    cmd.arg(svg).arg(png);
    cmd
}

fn imagemagick_convert_command(svg: &Path, png: &Path) -> Command {
    let mut cmd = Command::new("convert");
    cmd.arg(svg).arg(png);
    cmd
}

/// Fixed preference order; the first converter found wins.
const SVG_TO_PNG: &[Converter] = &[
    Converter { name: "rsvg-convert", build: rsvg_convert_command },
    Converter { name: "inkscape", build: inkscape_command },
    Converter { name: "magick", build: magick_command },
    Converter { name: "convert", build: imagemagick_convert_command },
];

fn run_logged(mut cmd: Command, what: &str) -> bool {
    match cmd.output() {
        Ok(out) if out.status.success() => true,
        Ok(out) => {
            eprintln!(
                "{} {what} failed:\n{}",
                "warning:".yellow().bold(),
                String::from_utf8_lossy(&out.stderr)
            );
            false
        }
        Err(err) => {
            eprintln!("{} could not run {what}: {err}", "warning:".yellow().bold());
            false
        }
    }
}

/// Render `mmd_path` to `graph_<stem>.svg` (and opportunistically
/// `graph_<stem>.png`) in `out_dir`.
///
/// Returns whether the SVG was produced; PNG conversion is purely
/// opportunistic on top of that.
pub fn export_image(
    mmd_path: &Path,
    out_dir: &Path,
    stem: &str,
    mmdc_path: Option<&Path>,
) -> bool {
    let mmdc = match mmdc_path {
        Some(path) => path.to_path_buf(),
        None => match find_in_path("mmdc") {
            Some(path) => path,
            None => {
                eprintln!(
                    "{} Mermaid CLI (mmdc) not found on PATH, skipping image export",
                    "info:".cyan().bold()
                );
                return false;
            }
        },
    };

    let svg_path = out_dir.join(format!("graph_{stem}.svg"));
    let mut cmd = Command::new(&mmdc);
    cmd.arg("-i").arg(mmd_path).arg("-o").arg(&svg_path);
    if !run_logged(cmd, "mmdc SVG export") {
        return false;
    }
    println!(
        "{} {}",
        "wrote".green().bold(),
        svg_path.display().to_string().bold()
    );

    let png_path = out_dir.join(format!("graph_{stem}.png"));
    rasterize_svg(&svg_path, &png_path);
    true
}

/// Try the converter chain; stop at the first binary found.
pub fn rasterize_svg(svg_path: &Path, png_path: &Path) -> bool {
    for converter in SVG_TO_PNG {
        if find_in_path(converter.name).is_none() {
            continue;
        }
        let cmd = (converter.build)(svg_path, png_path);
        let ok = run_logged(cmd, converter.name);
        if ok {
            println!(
                "{} {}",
                "wrote".green().bold(),
                png_path.display().to_string().bold()
            );
        }
        return ok;
    }
    eprintln!(
        "{} no SVG→PNG converter found (tried {}), keeping SVG only",
        "info:".cyan().bold(),
        SVG_TO_PNG
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_in_path_locates_known_binaries() {
        // `sh` is present on any platform these tests run on.
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely_not_a_real_binary_42").is_none());
    }

    #[test]
    fn export_degrades_when_tool_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mmd = dir.path().join("graph_x.mmd");
        std::fs::write(&mmd, "graph TD\n").unwrap();
        let missing = dir.path().join("not_a_tool");
        assert!(!export_image(&mmd, dir.path(), "x", Some(&missing)));
    }

    #[test]
    fn converter_order_is_fixed() {
        let names: Vec<&str> = SVG_TO_PNG.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["rsvg-convert", "inkscape", "magick", "convert"]);
    }
}
