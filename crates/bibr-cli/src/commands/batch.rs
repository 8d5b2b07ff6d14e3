//! Batch command - extract metadata from multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use bibr_core::{BibliographicRecord, BibliographyExtractor, DocumentKind};

use super::extract::{build_extractor, build_reader, format_record, load_config, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Skip OCR and use only embedded text extraction
    #[arg(long)]
    text_only: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Outcome of one processed file.
struct FileOutcome {
    path: PathBuf,
    outcome: Result<BibliographicRecord, String>,
    elapsed_ms: u64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    title: &'a str,
    author: &'a str,
    year: &'a str,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.text_only {
        config.document.ocr_fallback = false;
    }

    let files = matching_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }
    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // One reader and one extractor serve the whole run.
    let reader = build_reader(&config, args.model_dir.as_deref(), args.text_only);
    let extractor = build_extractor(&config, args.model_dir.as_deref());

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();

        let outcome = reader
            .read_path(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err("no text extracted".to_string())
                } else {
                    Ok(extractor.extract(&text))
                }
            });

        if let Err(ref msg) = outcome {
            if !args.continue_on_error {
                error!("Failed to process {}: {}", path.display(), msg);
                anyhow::bail!("Processing failed: {}", msg);
            }
            warn!("Failed to process {}: {}", path.display(), msg);
        }

        outcomes.push(FileOutcome {
            path,
            outcome,
            elapsed_ms: file_start.elapsed().as_millis() as u64,
        });
        progress.inc(1);
    }
    progress.finish_with_message("Complete");

    if let Some(ref output_dir) = args.output_dir {
        write_per_file_outputs(&outcomes, output_dir, args.format)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));
        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let ok_count = outcomes.iter().filter(|o| o.outcome.is_ok()).count();
    let failures: Vec<&FileOutcome> = outcomes.iter().filter(|o| o.outcome.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(ok_count).green(),
        style(failures.len()).red()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for o in failures {
            let msg = o.outcome.as_ref().err().map(String::as_str).unwrap_or("");
            println!("  - {}: {}", o.path.display(), msg);
        }
    }

    Ok(())
}

/// Expand a glob pattern, keeping only supported document kinds.
fn matching_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files = glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .unwrap_or_default();
            DocumentKind::from_extension(&ext).is_some()
        })
        .collect();
    Ok(files)
}

fn write_per_file_outputs(
    outcomes: &[FileOutcome],
    output_dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    };

    for o in outcomes {
        let Ok(ref record) = o.outcome else { continue };
        let stem = o
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("record");
        let target = output_dir.join(format!("{}.{}", stem, extension));
        fs::write(&target, format_record(record, format)?)?;
        debug!("Wrote output to {}", target.display());
    }
    Ok(())
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for o in outcomes {
        let filename = o.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let row = match &o.outcome {
            Ok(record) => SummaryRow {
                filename,
                status: "success",
                title: &record.title,
                author: &record.author,
                year: &record.year,
                processing_time_ms: o.elapsed_ms,
                error: "",
            },
            Err(msg) => SummaryRow {
                filename,
                status: "error",
                title: "",
                author: "",
                year: "",
                processing_time_ms: o.elapsed_ms,
                error: msg,
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}
