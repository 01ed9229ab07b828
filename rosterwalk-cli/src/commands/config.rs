//! Config command - manage configuration.

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use rosterwalk_store::{Config, default_config_dir};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a config file with every default spelled out.
    Init {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli, config: &Config, path: &Path) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, config),
        ConfigAction::Path => show_paths(cli, config, path),
        ConfigAction::Init { force } => init_config(path, *force),
    }
}

fn show_config(cli: &Cli, config: &Config) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let walk = &config.walk;
            println!("rosterwalk Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Log level:         {}", config.general.log_level);
            println!("Output dir:        {}", config.general.output_dir().display());
            match &config.browser.devtools_url {
                Some(url) => println!("Browser:           attach to {url}"),
                None => println!("Browser:           launch (headless: {})", config.browser.headless),
            }
            println!();
            println!("Origin:            {}", walk.origin);
            println!("Overlay timeout:   {} ms", walk.overlay_timeout_ms);
            println!("Click attempts:    {}", walk.click_attempts);
            println!("Scroll step:       {} px", walk.scroll_step_px);
            println!("Failure threshold: {}", walk.failure_threshold);
            println!("Failure ceiling:   {}", walk.failure_ceiling);
            println!("Bottom margin:     {} px", walk.bottom_margin_px);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, config: &Config, path: &Path) -> Result<()> {
    let config_dir = default_config_dir();
    let output_dir = config.general.output_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", path.display());
            println!("Output dir:  {}", output_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": path.display().to_string(),
                "output_dir": output_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to replace it)",
            path.display()
        );
    }

    Config::default().save_to(path)?;
    info!(path = %path.display(), "Config written");
    println!("Wrote {}", path.display());

    Ok(())
}
