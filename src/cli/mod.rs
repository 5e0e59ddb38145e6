//! CLI adapter for docsift
//!
//! Builds an [`ExtractionRequest`](crate::core::types::ExtractionRequest)
//! from command line arguments and hands it to the core services.
//! Nothing in `core/` depends on this module.

pub mod commands;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::core::services::Services;

/// docsift - keyword-in-context extraction for PDF and EPUB
///
/// Finds a keyword in each document and extracts the sentences
/// around it, optionally exporting embedded images.
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(version)]
#[command(about = "Keyword-in-context extraction for PDF and EPUB", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract keyword context (and images) into an output folder
    Extract(commands::ExtractArgs),

    /// Show keyword context for each document without writing files
    Search(commands::SearchArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  docsift completions bash > ~/.local/share/bash-completion/completions/docsift
    ///   zsh:   docsift completions zsh > ~/.zfunc/_docsift
    ///   fish:  docsift completions fish > ~/.config/fish/completions/docsift.fish
    Completions(commands::CompletionsArgs),
}

/// Install the tracing subscriber on stderr
///
/// `RUST_LOG` wins over `verbose` when set.
pub fn init_logging(verbose: u8, format: LogFormat) {
    let default_directive = match verbose {
        0 => "docsift=warn",
        1 => "docsift=info",
        _ => "docsift=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Completions need neither configuration nor services
    let command = match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    let config = Config::load()?;
    config.log_config();

    let services = Arc::new(Services::new(config));

    match command {
        Commands::Extract(args) => commands::extract::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
