//! Summarize command - print a document's leading segments.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use bibr_core::text::summarize_with;

use super::extract::{build_reader, load_config};

/// Arguments for the summarize command.
#[derive(Args)]
pub struct SummarizeArgs {
    /// Input file (text, PDF, DOCX or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Number of leading segments to keep (default from config)
    #[arg(short, long)]
    segments: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: SummarizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Summarizing file: {}", args.input.display());

    let reader = build_reader(&config, args.model_dir.as_deref(), false);
    let text = reader
        .read_path(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;

    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from {}", args.input.display());
    }

    let segments = args.segments.unwrap_or(config.extraction.summary_segments);
    let summary = summarize_with(&text, segments);

    if let Some(output_path) = &args.output {
        fs::write(output_path, &summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", summary);
    }

    Ok(())
}
