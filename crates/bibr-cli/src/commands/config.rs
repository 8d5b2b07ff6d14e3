//! Config command - inspect and edit the persisted configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use bibr_core::BibrConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "ner.backend")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_value(&key),
        ConfigCommand::Set { key, value } => set_value(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibr")
        .join("config.json")
}

/// Load the persisted configuration, or defaults when none exists.
fn load_or_default(announce_missing: bool) -> anyhow::Result<BibrConfig> {
    let path = default_config_path();
    if path.exists() {
        Ok(BibrConfig::from_file(&path)?)
    } else {
        if announce_missing {
            println!(
                "{} No config file found, showing defaults.",
                style("ℹ").blue()
            );
        }
        Ok(BibrConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    let config = load_or_default(true)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    BibrConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    Ok(())
}

fn get_value(key: &str) -> anyhow::Result<()> {
    let config = load_or_default(false)?;
    let tree = serde_json::to_value(&config)?;

    let node = key
        .split('.')
        .try_fold(&tree, |node, part| node.get(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}

fn set_value(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let config = load_or_default(false)?;

    // Values that parse as JSON keep their type, everything else is a string.
    let parsed: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut tree = serde_json::to_value(&config)?;
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((head, tail)) => (Some(head), tail),
        None => (None, key),
    };

    let mut node = &mut tree;
    if let Some(parents) = parents {
        node = parents
            .split('.')
            .try_fold(node, |n, part| n.get_mut(part))
            .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
    }
    match node.as_object_mut() {
        Some(obj) => obj.insert(leaf.to_string(), parsed.clone()),
        None => anyhow::bail!("Cannot set value at non-object path"),
    };

    let updated: BibrConfig = serde_json::from_value(tree)?;
    updated.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed)?
    );
    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'bibr config init' to create a configuration file.");
    }
    Ok(())
}
