//! Extract command - pull metadata from a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use bibr_core::{
    BibliographicRecord, BibliographyExtractor, BibrConfig, DocumentReader,
    HybridBibliographyExtractor, LexicalRecognizer, OcrEngine, TokenClassifier,
};

use super::models::{pack_dir, ModelPack};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (text, PDF, DOCX or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only embedded text extraction
    #[arg(long)]
    text_only: bool,

    /// Show processing time after extraction
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text report
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.text_only {
        config.document.ocr_fallback = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(20);

    let reader = build_reader(&config, args.model_dir.as_deref(), args.text_only);
    let text = reader
        .read_path(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;

    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from {}", args.input.display());
    }

    pb.set_message("Extracting metadata...");
    pb.set_position(60);

    let extractor = build_extractor(&config, args.model_dir.as_deref());
    let report = extractor.extract_with_report(&text);

    pb.set_position(100);
    pb.finish_with_message("Done");

    let output = format_record(&report.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.report {
        println!();
        println!(
            "{} Extraction time: {}ms",
            style("ℹ").blue(),
            report.processing_time_ms
        );
        println!(
            "{} Normalized text: {} characters",
            style("ℹ").blue(),
            report.normalized_text.len()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Load configuration from an explicit path, falling back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BibrConfig> {
    match config_path {
        Some(path) => Ok(BibrConfig::from_file(Path::new(path))?),
        None => Ok(BibrConfig::default()),
    }
}

/// Build a document reader, attaching an OCR engine when its model
/// files are present.
pub fn build_reader(
    config: &BibrConfig,
    model_dir: Option<&Path>,
    text_only: bool,
) -> DocumentReader {
    let reader = DocumentReader::new(config.document.clone());
    if text_only {
        return reader;
    }

    let ocr_dir = model_dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| pack_dir(ModelPack::Ocr));

    if !ocr_dir.join(&config.models.detection_model).exists() {
        debug!(
            "OCR models not found at {}, images and scanned PDFs will be skipped. \
             Run 'bibr models download --pack ocr' to fetch them.",
            ocr_dir.display()
        );
        return reader;
    }

    match OcrEngine::from_dir(&ocr_dir, &config.models) {
        Ok(engine) => reader.with_ocr(engine),
        Err(e) => {
            warn!("Failed to load OCR models from {}: {}", ocr_dir.display(), e);
            reader
        }
    }
}

/// Build the extractor with the recognizer named by the configuration.
///
/// An "onnx" backend that fails to load falls back to the lexical
/// recognizer so pattern extraction still runs.
pub fn build_extractor(
    config: &BibrConfig,
    model_dir: Option<&Path>,
) -> HybridBibliographyExtractor {
    let extractor =
        HybridBibliographyExtractor::new().with_entity_fallback(config.extraction.use_entity_fallback);

    match config.ner.backend.as_str() {
        "onnx" => {
            let ner_dir = model_dir
                .map(|d| d.to_path_buf())
                .unwrap_or_else(|| pack_dir(ModelPack::Ner));

            match TokenClassifier::from_dir(&ner_dir, &config.models, config.ner.max_seq_len) {
                Ok(classifier) => extractor.with_recognizer(Arc::new(classifier)),
                Err(e) => {
                    warn!(
                        "Failed to load NER model from {}, using lexical recognizer: {}",
                        ner_dir.display(),
                        e
                    );
                    extractor.with_recognizer(Arc::new(LexicalRecognizer::new()))
                }
            }
        }
        "lexical" => extractor.with_recognizer(Arc::new(LexicalRecognizer::new())),
        other => {
            warn!("Unknown NER backend '{}', using lexical recognizer", other);
            extractor.with_recognizer(Arc::new(LexicalRecognizer::new()))
        }
    }
}

pub fn format_record(
    record: &BibliographicRecord,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.serialize(record)?;
            let data = String::from_utf8(wtr.into_inner()?)?;
            Ok(data)
        }
        OutputFormat::Text => Ok(record.format_report()),
    }
}
