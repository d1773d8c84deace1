//! Pixdrop CLI: upload an image and browse the gallery.
//!
//! Reads PIXDROP_API_URL (or API_URL) and the upload policy from the
//! environment or a `.env` file. Progress and notices go to stderr; results
//! go to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pixdrop_cli::{format_gallery_table, init_tracing, print_json, ConsoleObserver};
use pixdrop_core::{CandidateFile, ClientConfig, ErrorMetadata};
use pixdrop_services::{NoopObserver, Quality, UploadError, UploadOptions, UploadOrchestrator};

#[derive(Parser)]
#[command(name = "pixdrop", about = "Upload images and browse the Pixdrop gallery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image (webp, jpeg, png or gif). Ctrl-C cancels.
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Re-encode to WebP before uploading
        #[arg(long)]
        convert: bool,
        /// WebP quality, 1-100 (default: PIXDROP_CONVERT_QUALITY)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
        /// Force the constrained deployment policy
        #[arg(long)]
        constrained: bool,
        /// Declared media type (default: derived from the extension)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// List uploaded images, newest first
    Gallery {
        /// Case-insensitive filter on file name and URL
        #[arg(long)]
        search: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            convert,
            quality,
            constrained,
            content_type,
        } => {
            let quality = Quality::new(quality.unwrap_or(config.convert_quality))?;
            let candidate = CandidateFile::from_path(&file, content_type.as_deref())
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;

            let orchestrator = Arc::new(
                UploadOrchestrator::from_config(&config, Arc::new(ConsoleObserver))
                    .context("Failed to create upload client")?,
            );
            orchestrator.set_options(UploadOptions {
                convert: convert.then_some(quality),
                constrained: constrained.then_some(true),
            });
            orchestrator
                .select_file(candidate)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            let canceller = orchestrator.clone();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    canceller.cancel();
                }
            });

            let result = orchestrator.upload().await;
            ctrl_c.abort();

            match result {
                Ok(image) => print_json(&image)?,
                Err(UploadError::Cancelled) => anyhow::bail!("Upload cancelled"),
                Err(e) => anyhow::bail!("{}", e.user_message()),
            }
        }
        Commands::Gallery { search, format } => {
            let orchestrator = UploadOrchestrator::from_config(&config, Arc::new(NoopObserver))
                .context("Failed to create gallery client")?;
            let total = orchestrator
                .refresh_gallery()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let items = orchestrator.search(search.as_deref().unwrap_or(""));

            match format {
                OutputFormat::Json => print_json(&items)?,
                OutputFormat::Table => {
                    print!("{}", format_gallery_table(&items, total, chrono::Utc::now()))
                }
            }
        }
    }

    Ok(())
}
