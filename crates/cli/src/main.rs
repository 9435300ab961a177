//! DocBrain CLI
//!
//! Main entry point for the docbrain command-line tool.
//! Ingests documents into a local vector index and answers questions
//! grounded in them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IngestCommand, StatsCommand};
use docbrain_core::logging::{self, LogFormat};
use docbrain_core::{config::AppConfig, AppResult};
use std::path::PathBuf;
use tracing::Instrument;

/// DocBrain - ask questions about your documents
#[derive(Parser, Debug)]
#[command(name = "docbrain")]
#[command(about = "Ask questions answered only from your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory holding the index, prompts and config (default: ./.docbrain)
    #[arg(short, long, global = true, env = "DOCBRAIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCBRAIN_CONFIG")]
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

    /// Completion provider (openai, ollama, mock)
    #[arg(short, long, global = true, env = "DOCBRAIN_PROVIDER")]
    provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true, env = "DOCBRAIN_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add documents to the index
    Ingest(IngestCommand),

    /// Ask a question about the indexed documents
    Ask(AskCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load_from(cli.data_dir.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.data_dir,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("DocBrain CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Stats(_) => "stats",
    };
    let result: AppResult<()> = async {
        // Stats only reads the index and needs no model credentials
        if !matches!(cli.command, Commands::Stats(_)) {
            config.validate()?;
        }

        match cli.command {
            Commands::Ingest(cmd) => cmd.execute(&config).await,
            Commands::Ask(cmd) => cmd.execute(&config).await,
            Commands::Stats(cmd) => cmd.execute(&config).await,
        }
    }
    .instrument(tracing::info_span!("command", name = command_name))
    .await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("{}", e.user_message());
        }
    }

    result
}
