//! Ratatoskr CLI - ratatoskr command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Ratatoskr - media relay and tagging bot
#[derive(Parser)]
#[command(name = "ratatoskr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Aggregator config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded updates (JSON lines) through the handlers
    Replay {
        /// Update file, or `-` for stdin
        input: String,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print an example config file
    Example,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so file logs are flushed
    let _guard = bot_lib::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Replay { input } => cmd::replay::run(config, &input).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cmd::config::run_show(config),
            ConfigCommands::Example => cmd::config::run_example(),
            ConfigCommands::Check => cmd::config::run_check(config),
        },
    }
}
