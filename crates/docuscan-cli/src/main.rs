//! docuscan CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docuscan::{DocuscanConfig, FormatDecoder, InputKind, InputLoader};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

#[derive(Parser)]
#[command(name = "docuscan")]
#[command(version, about = "Normalize documents into PNG pages for OCR", long_about = None)]
struct Cli {
    /// Config file (.toml, .yaml, .yml or .json). Defaults to a discovered docuscan.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document into PNG pages and keep them
    Pages {
        /// PDF, HEIC/HEIF or raster image
        input: PathBuf,

        /// Directory for the page files (overrides upload_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject PDFs with more pages than this
        #[arg(short = 'm', long)]
        max_pages: Option<usize>,

        /// PDF rasterization resolution
        #[arg(long)]
        dpi: Option<u16>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Report how many pages a document will produce
    Count {
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct PagesOutput {
    input: PathBuf,
    pages: Vec<PathBuf>,
}

#[derive(Serialize)]
struct CountOutput {
    input: PathBuf,
    kind: String,
    pages: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DocuscanConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Pages {
            input,
            output,
            max_pages,
            dpi,
            format,
        } => {
            if let Some(dpi) = dpi {
                config.render_dpi = dpi;
            }
            if max_pages.is_some() {
                config.max_pages = max_pages;
            }
            if let Some(output) = output {
                config.upload_dir = output;
            }
            config.validate().context("Invalid options")?;

            let pages = write_pages(&input, &config)?;
            match format {
                OutputFormat::Text => {
                    for page in &pages {
                        println!("{}", page.display());
                    }
                }
                OutputFormat::Json => print_json(&PagesOutput { input, pages })?,
            }
        }

        Commands::Count { input, format } => {
            let kind = InputKind::from_path(&input);
            let pages = FormatDecoder::new(config.render_dpi)
                .page_count(&input, kind)
                .with_context(|| format!("Failed to count pages of {}", input.display()))?;

            match format {
                OutputFormat::Text => println!("{}", pages),
                OutputFormat::Json => print_json(&CountOutput {
                    input,
                    kind: format!("{:?}", kind).to_lowercase(),
                    pages,
                })?,
            }
        }

        Commands::Config { format } => match format {
            OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
            OutputFormat::Json => print_json(&config)?,
        },
    }

    Ok(())
}

/// Load `input` and keep every page on disk.
fn write_pages(input: &Path, config: &DocuscanConfig) -> Result<Vec<PathBuf>> {
    let bundle = InputLoader::from_config(config)
        .load(input, None, config.max_pages)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    tracing::info!(pages = bundle.len(), dir = %config.upload_dir.display(), "Pages written");
    Ok(bundle.keep())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
