//! PSA Tool - command line front end
//!
//! Lists the week's clips, manages destination folders and settings, and
//! drives copy/stitch runs on the background worker.
//!
//! Usage:
//!   psa-tool list --filter promo
//!   psa-tool run --folder Fall --week 3 --rs promo --ms intro --ms outro --initials JD

mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use psa_core::config::ConfigManager;
use psa_core::logging::init_tracing_with_file;

/// Command-line arguments for psa-tool
#[derive(Parser, Debug)]
#[command(name = "psa-tool")]
#[command(about = "Weekly PSA asset tool: copy RS clips and stitch MS versions")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to psa_tool_settings.toml beside the executable)
    #[arg(long, global = true, env = "PSA_TOOL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List RS and MS clips in the source folder
    List {
        /// Only show names containing this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        filter: String,
    },

    /// List destination folders, optionally creating one
    Folders {
        /// Create this folder under the destination root first
        #[arg(long)]
        create: Option<String>,
    },

    /// Show or edit settings
    Settings {
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        dest_root: Option<PathBuf>,
        /// Write the changed paths to the settings file
        #[arg(long)]
        save: bool,
    },

    /// Copy RS clips and stitch MS versions into a destination folder
    Run(app::RunArgs),

    /// Check whether a newer release is published
    CheckUpdate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::for_app(),
    };
    config
        .load_or_default()
        .with_context(|| format!("Failed to load settings from {}", config.path().display()))?;

    let _guard = init_tracing_with_file(config.settings().logging.level, &config.logs_folder());
    tracing::debug!("psa-tool {} using {}", psa_core::version(), config.path().display());

    match cli.command {
        Command::List { filter } => app::list(&config, &filter),
        Command::Folders { create } => app::folders(&config, create.as_deref()),
        Command::Settings {
            source,
            dest_root,
            save,
        } => app::settings(&mut config, source, dest_root, save),
        Command::Run(args) => app::run(&config, args),
        Command::CheckUpdate => app::check_update(&config),
    }
}
