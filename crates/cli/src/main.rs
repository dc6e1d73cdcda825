//! newsdesk CLI
//!
//! Main entry point for the newsdesk command-line tool: ingest a folder of
//! text documents, then turn a question into a sourced research brief and a
//! social post.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{IngestCommand, PromptsCommand, QueryCommand, StatsCommand};
use newsdesk_core::{
    config::AppConfig,
    logging::{self, LogFormat},
};
use std::path::PathBuf;

/// newsdesk - retrieval-backed research briefs from your own documents
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Retrieval-backed research briefs from local documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "NEWSDESK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "NEWSDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Generation provider (ollama, openai, echo)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk and embed the documents in the data directory
    Ingest(IngestCommand),

    /// Retrieve context and run the stage pipeline for a question
    Query(QueryCommand),

    /// Show collection statistics
    Stats(StatsCommand),

    /// List stage prompts and where they come from
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ingest(_) => "ingest",
            Commands::Query(_) => "query",
            Commands::Stats(_) => "stats",
            Commands::Prompts(_) => "prompts",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file and environment, then CLI flags on top
    let config = AppConfig::load(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("newsdesk starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {} / model: {}", config.provider, config.model);

    config.validate()?;

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match &cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config),
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("newsdesk {} failed", cli.command.name()))
}
