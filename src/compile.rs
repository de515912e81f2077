//! `tmdc compile`: turn one TMD file, or every `*.md` file in a directory,
//! into standalone HTML pages.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tmd_parse::{RenderOptions, TmdDocument, Warning};
use walkdir::WalkDir;

use crate::template::PageTemplate;

pub struct CompileOpts<'a> {
    /// Output file for a single input, output directory for a directory input.
    pub output: Option<&'a Path>,
    pub template: &'a PageTemplate,
    pub render_options: &'a RenderOptions,
    pub quiet: bool,
}

/// What happened to one input file.
#[derive(Debug)]
pub struct FileReport {
    pub output: PathBuf,
    pub warnings: Vec<Warning>,
}

/// Compile `path`, which may be a file or a directory of `*.md` files.
pub fn handle_compile(path: &Path, opts: &CompileOpts) -> Result<Vec<FileReport>> {
    if path.is_file() {
        let output = match opts.output {
            Some(out) => out.to_path_buf(),
            None => default_output(path),
        };
        Ok(vec![compile_file(path, &output, opts)?])
    } else if path.is_dir() {
        let inputs = find_sources(path)?;
        if inputs.is_empty() {
            anyhow::bail!("No *.md files found in directory '{}'", path.display());
        }
        if let Some(dir) = opts.output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create '{}'", dir.display()))?;
        }

        inputs
            .iter()
            .map(|input| {
                let output = match opts.output {
                    Some(dir) => dir.join(output_file_name(input)),
                    None => default_output(input),
                };
                compile_file(input, &output, opts)
            })
            .collect()
    } else {
        anyhow::bail!("Path '{}' does not exist", path.display());
    }
}

/// `*.md` files directly inside `dir`, sorted by name.
pub fn find_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory '{}'", dir.display()))?;
        let is_md = entry.path().extension().is_some_and(|ext| ext == "md");
        if entry.file_type().is_file() && is_md {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

/// `guide.md` compiles to `guide.md.html` next to it.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_file_name(output_file_name(input))
}

fn output_file_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    format!("{name}.html")
}

fn compile_file(input: &Path, output: &Path, opts: &CompileOpts) -> Result<FileReport> {
    let quiet = opts.quiet;
    if !quiet {
        println!("{} {}:", "Processing".cyan().bold(), input.display());
    }

    if output.exists() {
        step(quiet, "Deleting old output file...");
        std::fs::remove_file(output)
            .with_context(|| format!("Failed to delete '{}'", output.display()))?;
        done(quiet, 0);
    }

    step(quiet, "Parsing...");
    let mut doc = TmdDocument::with_options(opts.render_options.clone());
    doc.load_file(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    done(quiet, doc.warnings().len());

    step(quiet, "Rendering...");
    let rendered = doc.render_html();
    done(quiet, doc.warnings().len());

    step(quiet, "Saving...");
    std::fs::write(output, opts.template.apply(&rendered.html))
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    done(quiet, 0);

    print_warnings(input, doc.warnings());

    Ok(FileReport {
        output: output.to_path_buf(),
        warnings: doc.warnings().to_vec(),
    })
}

fn step(quiet: bool, label: &str) {
    if !quiet {
        print!("  {label}");
    }
}

fn done(quiet: bool, warnings: usize) {
    if quiet {
        return;
    }
    if warnings == 0 {
        println!("{}", "OK".green());
    } else {
        println!("{}", format!("{warnings} warnings").yellow());
    }
}

/// Print warnings to stderr as `<path>:<line>: warning: [<code>] <message>`.
pub fn print_warnings(path: &Path, warnings: &[Warning]) {
    for warning in warnings {
        eprintln!(
            "{}:{}: {}: [{}] {}",
            path.display(),
            warning.line_number,
            "warning".yellow().bold(),
            warning.kind.code(),
            warning.message()
        );
    }
}

/// Open `path` with the platform's default handler (usually a browser).
pub fn open_in_browser(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };
    command
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tmdc-compile-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_output_appends_html() {
        assert_eq!(
            default_output(Path::new("docs/guide.md")),
            PathBuf::from("docs/guide.md.html")
        );
    }

    #[test]
    fn test_find_sources_is_sorted_and_non_recursive() {
        let dir = temp_dir("sources");
        std::fs::write(dir.join("b.md"), "B").unwrap();
        std::fs::write(dir.join("a.md"), "A").unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/c.md"), "C").unwrap();

        let sources = find_sources(&dir).unwrap();
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_compile_directory_into_output_dir() {
        let dir = temp_dir("dir");
        let out = dir.join("out");
        std::fs::write(dir.join("one.md"), "First step").unwrap();
        std::fs::write(dir.join("two.md"), "(#a)\nA\n- - -\n(#a)\nB").unwrap();

        let template = PageTemplate::builtin(crate::template::DEFAULT_PLACEHOLDER).unwrap();
        let render_options = RenderOptions::default();
        let opts = CompileOpts {
            output: Some(&out),
            template: &template,
            render_options: &render_options,
            quiet: true,
        };

        let reports = handle_compile(&dir, &opts).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].warnings.is_empty());
        assert_eq!(reports[1].warnings.len(), 1);

        let page = std::fs::read_to_string(out.join("one.md.html")).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("data-step-seqid=\"1\""));
        assert!(out.join("two.md.html").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_directory_fails() {
        let dir = temp_dir("empty");
        let template = PageTemplate::builtin(crate::template::DEFAULT_PLACEHOLDER).unwrap();
        let render_options = RenderOptions::default();
        let opts = CompileOpts {
            output: None,
            template: &template,
            render_options: &render_options,
            quiet: true,
        };
        let err = handle_compile(&dir, &opts).unwrap_err();
        assert!(err.to_string().contains("No *.md files"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
