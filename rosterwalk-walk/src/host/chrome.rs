//! Chrome DevTools backend for [`DomSession`].
//!
//! The session either attaches to a browser that is already running (and
//! already signed in) through its DevTools websocket URL, or launches Chrome
//! with a persistent profile directory. Signing in is never automated here.
//!
//! Row and overlay reads are single in-page scripts (see [`super::scripts`]).
//! Pointer and keyboard input uses CDP input events.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use super::scripts::{self, RenderedBounds, RowProbe, ScrollAck};
use super::{DomSession, OverlaySnapshot, RowHandle, RowSnapshot, ScrollMetrics};
use crate::context::Selectors;
use crate::error::DomError;

/// How often `wait_for` re-checks the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Connect Options
// ============================================================================

/// How to obtain a browser.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// DevTools websocket URL of a running browser. Takes precedence.
    pub devtools_url: Option<String>,
    /// Profile directory for a launched browser.
    pub user_data_dir: Option<PathBuf>,
    /// Chrome executable for a launched browser.
    pub chrome_executable: Option<PathBuf>,
    /// Launch without a window.
    pub headless: bool,
}

impl ConnectOptions {
    /// Attach to a running browser.
    pub fn attach(devtools_url: impl Into<String>) -> Self {
        Self {
            devtools_url: Some(devtools_url.into()),
            ..Default::default()
        }
    }

    /// Launch a browser with the given profile directory.
    pub fn launch(user_data_dir: Option<PathBuf>) -> Self {
        Self {
            user_data_dir,
            ..Default::default()
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

impl From<CdpError> for DomError {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::NotFound => DomError::NotFound("element".to_string()),
            CdpError::Timeout => DomError::Timeout {
                selector: "cdp request".to_string(),
                timeout: Duration::ZERO,
            },
            CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
                DomError::Disconnected(err.to_string())
            }
            other => DomError::Backend(other.to_string()),
        }
    }
}

// ============================================================================
// Chrome Session
// ============================================================================

/// A [`DomSession`] driving one Chrome tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    selectors: Selectors,
    launched: bool,
}

impl ChromeSession {
    /// Attaches to or launches a browser and opens a fresh tab.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Disconnected`] if the browser cannot be reached.
    #[instrument(skip(options, selectors), fields(attach = options.devtools_url.is_some()))]
    pub async fn connect(options: &ConnectOptions, selectors: Selectors) -> Result<Self, DomError> {
        let launched = options.devtools_url.is_none();

        let (browser, mut handler) = match &options.devtools_url {
            Some(url) => {
                info!(url = %url, "Attaching to running browser");
                Browser::connect(url.clone())
                    .await
                    .map_err(|e| DomError::Disconnected(format!("{url}: {e}")))?
            }
            None => {
                let mut builder = BrowserConfig::builder();
                if !options.headless {
                    builder = builder.with_head();
                }
                if let Some(dir) = &options.user_data_dir {
                    builder = builder.user_data_dir(dir);
                }
                if let Some(exe) = &options.chrome_executable {
                    builder = builder.chrome_executable(exe);
                }
                let config = builder.build().map_err(DomError::Backend)?;

                info!(headless = options.headless, "Launching browser");
                Browser::launch(config)
                    .await
                    .map_err(|e| DomError::Disconnected(format!("launch failed: {e}")))?
            }
        };

        let handler = tokio::spawn(async move {
            drive_handler(&mut handler).await;
        });

        let page = browser.new_page("about:blank").await?;
        debug!("Opened tab");

        Ok(Self {
            browser,
            page,
            handler,
            selectors,
            launched,
        })
    }

    /// Closes the tab, and the browser if this session launched it.
    pub async fn close(mut self) {
        log_close_step(self.page.clone().close().await, "close tab");
        if self.launched {
            log_close_step(self.browser.close().await, "close browser");
            log_close_step(self.browser.wait().await, "wait for browser exit");
        }
        self.handler.abort();
    }

    /// Selectors this session reads the list with.
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    async fn eval_as<T: DeserializeOwned>(&mut self, script: &str) -> Result<T, DomError> {
        let value = self.evaluate(script).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn rendered_bounds(&mut self) -> Result<RenderedBounds, DomError> {
        let script = scripts::rendered_bounds(&self.selectors);
        let bounds: RenderedBounds = self.eval_as(&script).await?;
        if bounds.container {
            Ok(bounds)
        } else {
            Err(DomError::ContainerMissing(self.selectors.member_list.clone()))
        }
    }

    async fn find(&self, selector: &str) -> Result<Element, DomError> {
        self.page.find_element(selector).await.map_err(|e| match e {
            CdpError::NotFound => DomError::NotFound(selector.to_string()),
            other => DomError::from(other),
        })
    }
}

/// Polls the browser's event stream until it ends, returning the number of
/// error events. Errors are logged and polling continues.
async fn drive_handler<H, E>(handler: &mut H) -> usize
where
    H: Stream<Item = Result<(), E>> + Unpin,
    E: fmt::Display,
{
    let mut errors = 0;
    while let Some(event) = handler.next().await {
        if let Err(e) = event {
            errors += 1;
            warn!(error = %e, "Browser handler error");
        }
    }
    debug!(errors, "Browser handler finished");
    errors
}

/// Logs a failed teardown step. Returns true if the step succeeded.
fn log_close_step<T, E: fmt::Display>(result: Result<T, E>, step: &str) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "Failed to {step}");
            false
        }
    }
}

impl fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeSession")
            .field("launched", &self.launched)
            .field("selectors", &self.selectors)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DomSession for ChromeSession {
    #[instrument(skip(self))]
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), DomError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                debug!(url = %url, "Navigation complete");
                Ok(())
            }
            Ok(Err(e)) => Err(DomError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(DomError::Navigation {
                url: url.to_string(),
                reason: format!("not ready after {timeout:?}"),
            }),
        }
    }

    async fn current_url(&mut self) -> Result<String, DomError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, DomError> {
        self.eval_as(&scripts::exists(selector)).await
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DomError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.exists(selector).await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DomError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_selector(&mut self, selector: &str) -> Result<(), DomError> {
        self.find(selector).await?.click().await?;
        Ok(())
    }

    async fn resolve_by_index(&mut self, index: u32) -> Result<Option<RowHandle>, DomError> {
        let script = scripts::probe_row(&self.selectors, index);
        let probe: RowProbe = self.eval_as(&script).await?;
        if !probe.container {
            return Err(DomError::ContainerMissing(self.selectors.member_list.clone()));
        }
        trace!(index, found = probe.found, "Probed row");
        Ok(probe
            .found
            .then(|| RowHandle::new(index, scripts::row_selector(&self.selectors, index))))
    }

    async fn highest_rendered_index(&mut self) -> Result<Option<u32>, DomError> {
        Ok(self.rendered_bounds().await?.max)
    }

    async fn lowest_rendered_index(&mut self) -> Result<Option<u32>, DomError> {
        Ok(self.rendered_bounds().await?.min)
    }

    async fn hover(&mut self, row: &RowHandle) -> Result<(), DomError> {
        self.find(&row.selector).await?.hover().await?;
        Ok(())
    }

    async fn click(&mut self, row: &RowHandle) -> Result<(), DomError> {
        self.find(&row.selector).await?.click().await?;
        Ok(())
    }

    async fn read_row(&mut self, row: &RowHandle) -> Result<RowSnapshot, DomError> {
        let script = scripts::read_row(&self.selectors, &row.selector);
        let snapshot: Option<RowSnapshot> = self.eval_as(&script).await?;
        snapshot.ok_or_else(|| DomError::NotFound(row.selector.clone()))
    }

    async fn read_overlay(&mut self) -> Result<Option<OverlaySnapshot>, DomError> {
        let script = scripts::read_overlay(&self.selectors);
        self.eval_as(&script).await
    }

    async fn press_key(&mut self, key: &str) -> Result<(), DomError> {
        self.find("body").await?.press_key(key).await?;
        Ok(())
    }

    async fn scroll_list_by(&mut self, pixels: i64) -> Result<(), DomError> {
        let script = scripts::scroll_by(&self.selectors, pixels);
        let ack: ScrollAck = self.eval_as(&script).await?;
        if ack.container {
            Ok(())
        } else {
            Err(DomError::ContainerMissing(self.selectors.member_list.clone()))
        }
    }

    async fn scroll_into_view(&mut self, index: u32) -> Result<(), DomError> {
        let selector = scripts::row_selector(&self.selectors, index);
        match self.find(&selector).await {
            Ok(element) => {
                element.scroll_into_view().await?;
                Ok(())
            }
            Err(DomError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn scroll_metrics(&mut self) -> Result<ScrollMetrics, DomError> {
        let script = scripts::scroll_metrics(&self.selectors);
        let metrics: Option<ScrollMetrics> = self.eval_as(&script).await?;
        metrics.ok_or_else(|| DomError::ContainerMissing(self.selectors.member_list.clone()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, DomError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(DomError::Script)?;

        let result = self.page.evaluate_expression(params).await?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}
