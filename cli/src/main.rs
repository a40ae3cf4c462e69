//! mdchart CLI - chart inference for numeric data in Markdown.
//!
//! Scans Markdown files for numeric data blocks and replaces them with
//! rendered charts and fallback tables, or dumps what was detected.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use mdchart::{classify, ChartType, ConvertOptions, ImageFormat};

/// Infer and render charts for numeric data blocks in Markdown
#[derive(Parser)]
#[command(
    name = "mdchart",
    author = "iyulab",
    version,
    about = "Infer and render charts for numeric data in Markdown",
    long_about = "mdchart - automatic chart inference for Markdown.\n\n\
                  Detects pipe tables, numeric bullet lists, and numeric code blocks,\n\
                  picks a chart shape for each, and replaces them with chart images\n\
                  plus HTML fallback tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace numeric data blocks with charts and fallback tables
    Convert {
        /// Input Markdown file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image encoding for rendered charts
        #[arg(long, default_value = "png")]
        image: ImageMode,

        /// Leave explicit `chart`-fenced blocks untouched
        #[arg(long)]
        no_chart_blocks: bool,

        /// Leave `mermaid`-fenced blocks untouched
        #[arg(long)]
        no_mermaid: bool,
    },

    /// Dump extracted blocks and their classifications as JSON
    Blocks {
        /// Input Markdown file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show a summary of detected blocks
    Info {
        /// Input Markdown file
        input: PathBuf,
    },
}

/// Image encoding
#[derive(Clone, ValueEnum)]
enum ImageMode {
    /// PNG raster images
    Png,
    /// Standalone SVG documents
    Svg,
}

impl From<ImageMode> for ImageFormat {
    fn from(mode: ImageMode) -> Self {
        match mode {
            ImageMode::Png => ImageFormat::Png,
            ImageMode::Svg => ImageFormat::Svg,
        }
    }
}

/// Reporter printing pipeline diagnostics as colored warnings.
struct CliReporter;

impl mdchart::Reporter for CliReporter {
    fn unsupported_table(&self, raw: &str) {
        eprintln!(
            "{} table-shaped block could not be parsed:\n{}",
            "warning:".yellow().bold(),
            raw.trim_end()
        );
    }

    fn render_failed(&self, context: &str, error: &mdchart::Error) {
        eprintln!(
            "{} chart skipped for {}: {}",
            "warning:".yellow().bold(),
            context,
            error
        );
    }

    fn overlap_skipped(&self, span: &mdchart::SourceSpan) {
        eprintln!(
            "{} block at bytes {}..{} overlaps an earlier replacement, skipped",
            "warning:".yellow().bold(),
            span.start,
            span.end
        );
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            image,
            no_chart_blocks,
            no_mermaid,
        } => {
            let text = fs::read_to_string(&input)?;
            let options = ConvertOptions::new()
                .with_image_format(image.into())
                .with_chart_blocks(!no_chart_blocks)
                .with_mermaid_placeholder(!no_mermaid);

            let converted = mdchart::convert_with_reporter(&text, &options, &CliReporter);
            write_output(output.as_ref(), &converted.output)?;

            if let Some(path) = output {
                println!(
                    "{} Replaced {} block(s), rendered {} chart block(s): {}",
                    "✓".green().bold(),
                    converted.replaced,
                    converted.chart_blocks,
                    path.display()
                );
            }
        }

        Commands::Blocks {
            input,
            output,
            compact,
        } => {
            let text = fs::read_to_string(&input)?;
            let extraction = mdchart::extract(&text);

            let blocks: Vec<serde_json::Value> = extraction
                .blocks
                .iter()
                .map(|block| {
                    serde_json::json!({
                        "chart_type": classify(block),
                        "block": block,
                    })
                })
                .collect();
            let dump = serde_json::json!({
                "blocks": blocks,
                "unsupported": extraction.unsupported,
            });

            let json = if compact {
                serde_json::to_string(&dump)?
            } else {
                serde_json::to_string_pretty(&dump)?
            };
            write_output(output.as_ref(), &json)?;
        }

        Commands::Info { input } => {
            let text = fs::read_to_string(&input)?;
            let extraction = mdchart::extract(&text);

            println!("{} {}", "File:".bold(), input.display());
            println!("{} {}", "Blocks:".bold(), extraction.blocks.len());
            for (i, block) in extraction.blocks.iter().enumerate() {
                let chart_type = classify(block);
                let marker = if chart_type == ChartType::TableOnly {
                    "table only".dimmed().to_string()
                } else {
                    chart_type.to_string().green().to_string()
                };
                println!(
                    "  {}. {} at bytes {}..{} -> {}",
                    i + 1,
                    block.kind(),
                    block.span.start,
                    block.span.end,
                    marker
                );
            }
            if !extraction.unsupported.is_empty() {
                println!(
                    "{} {}",
                    "Unsupported table-shaped blocks:".yellow().bold(),
                    extraction.unsupported.len()
                );
            }
        }
    }

    Ok(())
}

fn write_output(path: Option<&PathBuf>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, content),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes())?;
            handle.write_all(b"\n")
        }
    }
}
