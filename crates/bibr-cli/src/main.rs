//! CLI application for bibliographic metadata extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, models, summarize};

/// bibr - Extract bibliographic metadata from documents
#[derive(Parser)]
#[command(name = "bibr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metadata from a single document
    Extract(extract::ExtractArgs),

    /// Extract metadata from multiple documents
    Batch(batch::BatchArgs),

    /// Summarize a document's leading segments
    Summarize(summarize::SummarizeArgs),

    /// Manage OCR and NER models
    Models(models::ModelsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Each -v step raises the log level, starting from warnings only.
fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Summarize(args) => summarize::run(args, cli.config.as_deref()).await,
        Commands::Models(args) => models::run(args).await,
        Commands::Config(args) => config::run(args).await,
    }
}
