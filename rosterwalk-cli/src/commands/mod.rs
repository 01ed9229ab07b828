//! CLI command implementations.

pub mod config;
pub mod profile;
pub mod scrape;
pub mod show;

use std::path::PathBuf;

use clap::Args;
use rosterwalk_store::Config;
use rosterwalk_walk::{ChromeSession, ConnectOptions};
use tracing::info;

use crate::CliFailure;

/// Browser flags shared by every command that drives a page.
#[derive(Args, Debug, Default)]
pub struct BrowserArgs {
    /// DevTools websocket URL of a running, signed-in Chrome.
    #[arg(long, value_name = "WS_URL")]
    pub connect: Option<String>,

    /// Profile directory for a launched Chrome.
    #[arg(long, value_name = "DIR")]
    pub user_data_dir: Option<PathBuf>,

    /// Chrome executable to launch.
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Launch Chrome without a window.
    #[arg(long)]
    pub headless: bool,
}

impl BrowserArgs {
    /// Connect options from the config file, overridden by these flags.
    pub fn connect_options(&self, config: &Config) -> ConnectOptions {
        let mut options = config.browser.connect_options();
        if let Some(url) = &self.connect {
            options.devtools_url = Some(url.clone());
        }
        if let Some(dir) = &self.user_data_dir {
            options.user_data_dir = Some(dir.clone());
        }
        if let Some(exe) = &self.chrome {
            options.chrome_executable = Some(exe.clone());
        }
        options.headless |= self.headless;
        options
    }

    /// Opens a browser session, reporting failure as an unavailable browser.
    pub async fn open(&self, config: &Config) -> Result<ChromeSession, CliFailure> {
        let options = self.connect_options(config);
        info!(attach = options.devtools_url.is_some(), "Opening browser");
        ChromeSession::connect(&options, config.selectors.clone())
            .await
            .map_err(CliFailure::BrowserUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.browser.devtools_url = Some("ws://config".into());
        config.browser.headless = false;

        let args = BrowserArgs {
            connect: Some("ws://flag".into()),
            headless: true,
            ..Default::default()
        };
        let options = args.connect_options(&config);

        assert_eq!(options.devtools_url.as_deref(), Some("ws://flag"));
        assert!(options.headless);
    }

    #[test]
    fn test_config_used_without_flags() {
        let mut config = Config::default();
        config.browser.user_data_dir = Some(PathBuf::from("/profiles/walk"));

        let options = BrowserArgs::default().connect_options(&config);
        assert!(options.devtools_url.is_none());
        assert_eq!(options.user_data_dir, Some(PathBuf::from("/profiles/walk")));
    }
}
