// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! rosterwalk CLI - export a chat server's member list from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Walk the member list of a channel in an already signed-in browser
//! rosterwalk scrape https://discord.com/channels/123/456 \
//!     --connect ws://127.0.0.1:9222/devtools/browser/<id>
//!
//! # Launch Chrome with the rosterwalk profile instead
//! rosterwalk scrape https://discord.com/channels/123/456
//!
//! # Read an export back
//! rosterwalk show ~/.local/share/rosterwalk/exports/members-20240314T091502.123Z.json
//!
//! # JSON output
//! rosterwalk --format json --pretty show members.json
//!
//! # Open a member's profile page
//! rosterwalk profile 123456789012345678
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rosterwalk_store::{Config, LogLevel};
use rosterwalk_walk::{DomError, WalkError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, profile, scrape, show};

// ============================================================================
// CLI Definition
// ============================================================================

/// rosterwalk CLI - member list export.
#[derive(Parser)]
#[command(name = "rosterwalk")]
#[command(about = "Export a chat server's member list")]
#[command(long_about = r#"
rosterwalk walks the virtualized member list of a Discord channel in a
signed-in Chrome session and writes one JSON document per run.

The browser is either attached to through its DevTools URL (start Chrome
with --remote-debugging-port) or launched with a dedicated profile that you
sign in to once.

Examples:
  rosterwalk scrape <channel-url>          # Walk and export
  rosterwalk show <file>                   # Read an export back
  rosterwalk profile <user-id>             # Open a profile page
  rosterwalk config init                   # Write a default config file
"#)]
#[command(version)]
#[command(author = "rosterwalk Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Walk a channel's member list and write the records.
    #[command(visible_alias = "s")]
    Scrape(scrape::ScrapeArgs),

    /// Print a previously written member document.
    Show(show::ShowArgs),

    /// Open a member's profile page.
    Profile(profile::ProfileArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No browser could be attached to or launched.
    BrowserUnavailable = 2,
    /// The member list never appeared.
    ListNotFound = 3,
    /// The walk finished without a single record.
    EmptyResult = 4,
}

/// Failures the CLI reports with a dedicated exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliFailure {
    /// Connecting to the browser failed.
    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(#[source] DomError),

    /// The walk completed but found nobody.
    #[error("No members were found")]
    EmptyResult,
}

impl ExitCode {
    /// Maps an error to the exit code it is reported with.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(failure) = err.downcast_ref::<CliFailure>() {
            return match failure {
                CliFailure::BrowserUnavailable(_) => Self::BrowserUnavailable,
                CliFailure::EmptyResult => Self::EmptyResult,
            };
        }
        match err.downcast_ref::<WalkError>() {
            Some(WalkError::ListNotFound(_)) => Self::ListNotFound,
            Some(WalkError::Session(DomError::Disconnected(_))) => Self::BrowserUnavailable,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("rosterwalk=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("rosterwalk={level},warn")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let loaded = Config::load_from(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.general.log_level)
        .unwrap_or_default();

    setup_logging(cli.verbose, cli.quiet, level);

    let result = match loaded {
        Ok(config) => match &cli.command {
            Commands::Scrape(args) => scrape::run(args, &cli, &config).await,
            Commands::Show(args) => show::run(args, &cli).await,
            Commands::Profile(args) => profile::run(args, &cli, &config).await,
            Commands::Config(args) => config::run(args, &cli, &config, &config_path),
        },
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to load config from {}", config_path.display()))),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
