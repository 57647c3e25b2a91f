//! notelink CLI
//!
//! Main entry point for the notelink command-line tool: turn video
//! transcripts into vault notes cross-linked by semantic similarity.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, RelatedCommand, StatsCommand};
use notelink_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Transcript notes with semantic cross-links
#[derive(Parser, Debug)]
#[command(name = "notelink")]
#[command(about = "Turn video transcripts into semantically linked notes", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the note vault (default: current directory)
    #[arg(long, global = true, env = "NOTELINK_VAULT")]
    vault: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "NOTELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Model identifier for the text-analysis backend
    #[arg(short, long, global = true, env = "NOTELINK_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a video: transcribe, embed, link, and write the note
    Ingest(IngestCommand),

    /// Find notes related to ad-hoc text
    Related(RelatedCommand),

    /// Show vector store statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration from environment, then apply CLI overrides
    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.vault,
        cli.config,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Vault: {:?}", config.vault);
    tracing::debug!("Model: {}", config.model);

    config.ensure_notelink_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Related(_) => "related",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Related(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
