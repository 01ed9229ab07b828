//! Show command - print a member document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rosterwalk_store::load_document;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Member document to read.
    pub file: PathBuf,

    /// Print at most this many members.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Runs the show command.
pub async fn run(args: &ShowArgs, cli: &Cli) -> Result<()> {
    let document = load_document(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_document(&document, args.limit));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_document(&document, args.limit)?);
        }
    }

    Ok(())
}
