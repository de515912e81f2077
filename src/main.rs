use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tmd_parse::{QualifierStyle, RenderOptions, TmdDocument};

use crate::template::{DEFAULT_PLACEHOLDER, PageTemplate};

mod compile;
mod config;
mod template;

#[derive(Parser)]
#[command(name = "tmdc", version, about = "Tutorial Markdown (TMD) compiler")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show the full error chain on failure
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a TMD file, or every *.md file in a directory, to HTML
    Compile {
        /// Input file or directory
        path: PathBuf,

        /// Output file (single input) or directory (directory input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTML page template file
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Marker in the template replaced by the compiled body
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Configuration file, created with defaults if missing
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Open the compiled page in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Load and render TMD file(s) without writing, reporting warnings
    Check {
        /// Path to the TMD file(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Rewrite a TMD file in canonical form
    Format {
        /// Path to the TMD file
        file: PathBuf,

        /// Use `<!-- q -->` comment qualifiers instead of `(q)`
        #[arg(long)]
        long: bool,

        /// Overwrite the file instead of printing to stdout
        #[arg(long)]
        write: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "FAILED:".red().bold(), e);
        if debug {
            eprintln!("{e:?}");
        }
        eprintln!("Program execution terminated.");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compile {
            path,
            output,
            template,
            placeholder,
            config,
            open,
        } => {
            let render_options = load_render_options(config.as_deref(), cli.quiet)?;
            let page = match &template {
                Some(file) => PageTemplate::from_file(file, &placeholder)?,
                None => PageTemplate::builtin(&placeholder)?,
            };
            let opts = compile::CompileOpts {
                output: output.as_deref(),
                template: &page,
                render_options: &render_options,
                quiet: cli.quiet,
            };

            let reports = compile::handle_compile(&path, &opts)?;
            if open {
                for report in &reports {
                    compile::open_in_browser(&report.output)?;
                }
            }
            if !cli.quiet {
                let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
                println!(
                    "{} {} file(s), {} warning(s)",
                    "Compiled".green().bold(),
                    reports.len(),
                    warnings
                );
            }
        }
        Commands::Check { files } => {
            handle_check(&files, cli.quiet)?;
        }
        Commands::Format { file, long, write } => {
            let style = if long {
                QualifierStyle::Long
            } else {
                QualifierStyle::Short
            };
            handle_format(&file, style, write, cli.quiet)?;
        }
    }

    Ok(())
}

fn load_render_options(config_path: Option<&Path>, quiet: bool) -> Result<RenderOptions> {
    let Some(path) = config_path else {
        return Ok(RenderOptions::default());
    };
    let (config, source) = config::load_or_create(path)?;
    if !quiet {
        match source {
            config::ConfigSource::Read => {
                println!("{} configuration from {}", "Read".dimmed(), path.display())
            }
            config::ConfigSource::Created => println!(
                "{} default configuration to {}",
                "Wrote".dimmed(),
                path.display()
            ),
        }
    }
    Ok(config.render_options)
}

fn read_document(file: &Path) -> Result<TmdDocument> {
    let mut doc = TmdDocument::new();
    doc.load_file(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    Ok(doc)
}

fn handle_check(files: &[PathBuf], quiet: bool) -> Result<()> {
    let mut has_warnings = false;

    for file in files {
        let mut doc = read_document(file)?;
        doc.render_html();

        if doc.warnings().is_empty() {
            if !quiet {
                println!("{}: {}", file.display(), "OK".green());
            }
        } else {
            has_warnings = true;
            compile::print_warnings(file, doc.warnings());
        }
    }

    if has_warnings {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_format(file: &Path, style: QualifierStyle, write: bool, quiet: bool) -> Result<()> {
    let doc = read_document(file)?;
    compile::print_warnings(file, doc.warnings());

    if write {
        doc.save_file(file, style)
            .with_context(|| format!("Failed to write '{}'", file.display()))?;
        if !quiet {
            println!("{} {}", "Formatted".green().bold(), file.display());
        }
    } else {
        print!("{}", doc.save(style));
    }

    Ok(())
}
