//! Scrape command - walk a member list and persist the records.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rosterwalk_store::{Config, JsonFileSink};
use rosterwalk_walk::{WalkContext, scrape_and_persist};
use tracing::{info, warn};

use super::BrowserArgs;
use crate::output::{JsonFormatter, ScrapeSummary, TextFormatter};
use crate::{Cli, CliFailure, OutputFormat};

/// Arguments for the scrape command.
#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Channel URL whose member list is walked.
    pub url: String,

    /// Directory the member document is written to.
    #[arg(long, short, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Consecutive failures that end the walk at the bottom of the list.
    #[arg(long)]
    pub failure_threshold: Option<u32>,

    /// List index to start at.
    #[arg(long)]
    pub start_index: Option<u32>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Runs the scrape command.
pub async fn run(args: &ScrapeArgs, cli: &Cli, config: &Config) -> Result<()> {
    let mut settings = config.walk_settings();
    if let Some(threshold) = args.failure_threshold {
        settings.failure_threshold = threshold.max(1);
    }
    if let Some(index) = args.start_index {
        settings.start_index = index;
    }
    let ctx = WalkContext::with_settings(settings);

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.general.output_dir());
    let sink = JsonFileSink::new(output_dir);

    let mut session = args.browser.open(config).await?;
    info!(url = %args.url, "Walking member list");

    let result = scrape_and_persist(&ctx, &mut session, &sink, &args.url).await;
    session.close().await;
    let (outcome, path) = result?;

    let summary = ScrapeSummary::new(&outcome, &path);
    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                let formatter = TextFormatter::new(!cli.no_color);
                println!("{}", formatter.format_summary(&summary));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&summary)?);
        }
    }

    if outcome.is_empty() {
        warn!("Walk finished without finding any member");
        return Err(CliFailure::EmptyResult.into());
    }

    Ok(())
}
