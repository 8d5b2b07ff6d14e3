//! Models command - download and manage OCR and NER models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List available model packs
    List,

    /// Download a model pack
    Download(DownloadArgs),

    /// Check model status
    Status(StatusArgs),

    /// Remove downloaded models
    Clean(CleanArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelPack {
    /// Text detection, recognition and dictionary for scanned documents
    Ocr,
    /// Token-classification model for the entity fallback
    Ner,
}

impl ModelPack {
    const ALL: [ModelPack; 2] = [ModelPack::Ocr, ModelPack::Ner];
}

impl std::fmt::Display for ModelPack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelPack::Ocr => write!(f, "ocr"),
            ModelPack::Ner => write!(f, "ner"),
        }
    }
}

#[derive(Args)]
struct DownloadArgs {
    /// Model pack to download
    #[arg(short, long, value_enum)]
    pack: ModelPack,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Check specific pack only
    #[arg(short, long, value_enum)]
    pack: Option<ModelPack>,
}

#[derive(Args)]
struct CleanArgs {
    /// Clean specific pack only
    #[arg(short, long, value_enum)]
    pack: Option<ModelPack>,

    /// Clean all packs
    #[arg(long)]
    all: bool,
}

/// Model file information with download URL.
#[derive(Clone)]
struct ModelInfo {
    filename: &'static str,
    size_bytes: u64,
    description: &'static str,
    url: &'static str,
}

fn pack_models(pack: ModelPack) -> Vec<ModelInfo> {
    match pack {
        ModelPack::Ocr => vec![
            ModelInfo {
                filename: "det.onnx",
                size_bytes: 4_500_000,
                description: "Text detection",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ocr/det.onnx",
            },
            ModelInfo {
                filename: "latin_rec.onnx",
                size_bytes: 7_500_000,
                description: "Latin text recognition",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ocr/latin_rec.onnx",
            },
            ModelInfo {
                filename: "latin_dict.txt",
                size_bytes: 2_000,
                description: "Latin character dictionary",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ocr/latin_dict.txt",
            },
        ],
        ModelPack::Ner => vec![
            ModelInfo {
                filename: "ner.onnx",
                size_bytes: 17_000_000,
                description: "Token classification",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ner/ner.onnx",
            },
            ModelInfo {
                filename: "vocab.txt",
                size_bytes: 230_000,
                description: "Wordpiece vocabulary",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ner/vocab.txt",
            },
            ModelInfo {
                filename: "labels.txt",
                size_bytes: 100,
                description: "BIO label set",
                url: "https://github.com/bibr-project/bibr/raw/main/models/ner/labels.txt",
            },
        ],
    }
}

/// Directory where a pack's model files live.
pub fn pack_dir(pack: ModelPack) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibr")
        .join("models")
        .join(pack.to_string())
}

/// A truncated download is smaller than half the expected size.
fn plausibly_complete(len: u64, expected: u64) -> bool {
    len > expected / 2
}

/// On-disk state of a single model file.
enum FileState {
    Present(u64),
    Incomplete(u64),
    Missing,
}

fn file_state(dir: &Path, model: &ModelInfo) -> FileState {
    let path = dir.join(model.filename);
    match fs::metadata(&path) {
        Ok(meta) if plausibly_complete(meta.len(), model.size_bytes) => {
            FileState::Present(meta.len())
        }
        Ok(meta) => FileState::Incomplete(meta.len()),
        Err(_) => FileState::Missing,
    }
}

pub async fn run(args: ModelsArgs) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::List => list_models(),
        ModelsCommand::Download(download_args) => download_models(download_args).await,
        ModelsCommand::Status(status_args) => check_status(status_args),
        ModelsCommand::Clean(clean_args) => clean_models(clean_args),
    }
}

fn list_models() -> anyhow::Result<()> {
    println!("{}", style("Available Model Packs").bold());
    println!();

    for pack in ModelPack::ALL {
        let models = pack_models(pack);
        let total: u64 = models.iter().map(|m| m.size_bytes).sum();

        let desc = match pack {
            ModelPack::Ocr => "- images and scanned PDFs",
            ModelPack::Ner => "- entity fallback for missed fields",
        };

        println!(
            "{} {} {}",
            style(format!("▸ {}", pack)).bold().cyan(),
            format_size(total),
            style(desc).dim()
        );
        for model in &models {
            println!(
                "    {:<20} {:>10}  {}",
                model.filename,
                format_size(model.size_bytes),
                model.description
            );
        }
        println!();
    }

    println!("Commands:");
    println!("  bibr models download --pack ocr    Download OCR models (~12MB)");
    println!("  bibr models download --pack ner    Download NER models (~17MB)");
    println!("  bibr models status                 Show what is installed");

    Ok(())
}

async fn download_models(args: DownloadArgs) -> anyhow::Result<()> {
    let pack = args.pack;
    let output_dir = args.output.unwrap_or_else(|| pack_dir(pack));
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading {} models to {}",
        style("ℹ").blue(),
        style(pack.to_string()).cyan().bold(),
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("bibr-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let progress = MultiProgress::new();
    let (mut fetched, mut skipped, mut failed) = (0u32, 0u32, 0u32);

    for model in pack_models(pack) {
        if !args.force {
            if let FileState::Present(len) = file_state(&output_dir, &model) {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    model.filename,
                    format_size(len)
                );
                skipped += 1;
                continue;
            }
        }

        let pb = progress.add(ProgressBar::new(model.size_bytes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.to_string());

        let target = output_dir.join(model.filename);
        match fetch_file(&client, model.url, &target, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                fetched += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                failed += 1;
            }
        }
    }

    println!();
    if failed == 0 {
        println!(
            "{} {} models downloaded successfully!",
            style("✓").green().bold(),
            pack
        );
        if skipped > 0 {
            println!("   {} downloaded, {} already present", fetched, skipped);
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!("   {} downloaded, {} skipped, {} failed", fetched, skipped, failed);
        println!();
        println!(
            "Retry failed downloads with: bibr models download --pack {} --force",
            pack
        );
    }

    println!();
    check_status(StatusArgs { pack: Some(pack) })
}

/// Stream one file to disk. The body lands in a `.tmp` sibling that is
/// renamed into place only when the stream finishes.
async fn fetch_file(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }
    if let Some(total) = response.content_length() {
        pb.set_length(total);
    }

    let staging = target.with_extension("tmp");
    let mut file = File::create(&staging)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    file.flush()?;
    drop(file);

    fs::rename(&staging, target)?;
    Ok(())
}

fn check_status(args: StatusArgs) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!();

    let packs = match args.pack {
        Some(p) => vec![p],
        None => ModelPack::ALL.to_vec(),
    };

    for pack in packs {
        let model_dir = pack_dir(pack);
        println!(
            "{} {}",
            style(format!("▸ {}", pack)).bold(),
            model_dir.display()
        );

        let mut ready = true;
        let mut installed: u64 = 0;

        for model in pack_models(pack) {
            let (symbol, detail) = match file_state(&model_dir, &model) {
                FileState::Present(len) => {
                    installed += len;
                    (style("✓").green(), format_size(len))
                }
                FileState::Incomplete(len) => {
                    installed += len;
                    ready = false;
                    (
                        style("⚠").yellow(),
                        format!("{} (incomplete?)", format_size(len)),
                    )
                }
                FileState::Missing => {
                    ready = false;
                    (style("✗").red(), "missing".to_string())
                }
            };
            println!("    {} {:<25} {:>10}", symbol, model.filename, detail);
        }

        if ready {
            println!(
                "    {} Ready ({} total)",
                style("✓").green(),
                format_size(installed)
            );
        } else {
            println!(
                "    {} Run 'bibr models download --pack {}' to download",
                style("⚠").yellow(),
                pack
            );
        }
        println!();
    }

    Ok(())
}

fn clean_models(args: CleanArgs) -> anyhow::Result<()> {
    let packs = if args.all {
        ModelPack::ALL.to_vec()
    } else if let Some(p) = args.pack {
        vec![p]
    } else {
        println!(
            "{} Specify --all to remove all models or --pack <pack> for a specific pack",
            style("ℹ").blue()
        );
        return Ok(());
    };

    let mut removed = 0u32;
    let mut freed: u64 = 0;

    for pack in packs {
        let model_dir = pack_dir(pack);
        if !model_dir.exists() {
            continue;
        }
        println!("{} Cleaning {} models...", style("⚠").yellow(), pack);

        for model in pack_models(pack) {
            let path = model_dir.join(model.filename);
            if let Ok(meta) = fs::metadata(&path) {
                fs::remove_file(&path)?;
                removed += 1;
                freed += meta.len();
                println!("  {} Removed {}", style("✓").green(), model.filename);
            }
        }

        // Interrupted downloads leave .tmp files behind.
        if let Ok(entries) = fs::read_dir(&model_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "tmp") {
                    let _ = fs::remove_file(&path);
                }
            }
        }
    }

    if removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            removed,
            format_size(freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
