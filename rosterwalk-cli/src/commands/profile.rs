//! Profile command - open a member's profile page.

use anyhow::Result;
use clap::Args;
use rosterwalk_store::Config;
use rosterwalk_walk::{WalkContext, open_profile};

use super::BrowserArgs;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the profile command.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Numeric account id.
    pub user_id: String,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Runs the profile command.
pub async fn run(args: &ProfileArgs, cli: &Cli, config: &Config) -> Result<()> {
    let ctx = WalkContext::with_settings(config.walk_settings());
    let mut session = args.browser.open(config).await?;

    let result = open_profile(&ctx, &mut session, &args.user_id).await;
    session.close().await;
    let url = result?;

    match cli.format {
        OutputFormat::Text => println!("Profile loaded: {url}"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "userID": args.user_id,
                "url": url,
                "loaded": true,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}
