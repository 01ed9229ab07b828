//! End-to-end runs: navigate, reveal the list, traverse, persist.

use std::path::PathBuf;

use rosterwalk_core::RecordSink;
use tracing::{debug, info, instrument};
use url::Url;

use crate::context::WalkContext;
use crate::error::{DomError, WalkError};
use crate::host::{DomSession, scripts};
use crate::traversal::{TraversalController, WalkOutcome};
use crate::visibility::ensure_list_visible;

/// Checks that `url` is an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`WalkError::InvalidUrl`] otherwise.
pub fn validate_url(url: &str) -> Result<Url, WalkError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(WalkError::InvalidUrl(format!("unsupported scheme: {other}"))),
    }
}

/// Walks the member list at `url` and returns every record found.
///
/// # Errors
///
/// Returns a [`WalkError`] if navigation fails, the list never shows up, or
/// the session fails fatally mid-run. No partial result is returned.
#[instrument(skip(ctx, session))]
pub async fn scrape_members<S: DomSession + ?Sized>(
    ctx: &WalkContext,
    session: &mut S,
    url: &str,
) -> Result<WalkOutcome, WalkError> {
    let target = validate_url(url)?;
    let settings = &ctx.settings;
    let selectors = ctx.selectors();

    info!("Navigating");
    session
        .navigate(target.as_str(), settings.navigation_timeout)
        .await?;

    ensure_list_visible(ctx, session).await?;

    match session
        .wait_for(&selectors.member_list, settings.list_timeout)
        .await
    {
        Ok(()) => {}
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(DomError::Timeout { .. }) => {
            if session.exists(&selectors.login_marker).await.unwrap_or(false) {
                return Err(WalkError::SignedOut);
            }
            return Err(WalkError::ListNotFound(selectors.member_list.clone()));
        }
        Err(e) => return Err(e.into()),
    }

    let first_row = scripts::row_selector(selectors, settings.start_index);
    if let Err(e) = session.wait_for(&first_row, settings.first_row_timeout).await {
        if e.is_fatal() {
            return Err(e.into());
        }
        debug!(error = %e, "First row not rendered yet");
    }

    TraversalController::new(ctx).run(session).await
}

/// Runs [`scrape_members`] and hands the records to `sink`.
///
/// Nothing is written when the run fails.
///
/// # Errors
///
/// Returns the run's error, or [`WalkError::Persist`] if the sink fails.
pub async fn scrape_and_persist<S, K>(
    ctx: &WalkContext,
    session: &mut S,
    sink: &K,
    url: &str,
) -> Result<(WalkOutcome, PathBuf), WalkError>
where
    S: DomSession + ?Sized,
    K: RecordSink,
{
    let outcome = scrape_members(ctx, session, url).await?;

    let path = sink
        .write(&outcome.records, Some(url))
        .await
        .map_err(|e| WalkError::Persist(e.to_string()))?;

    info!(path = %path.display(), count = outcome.count(), "Records written");
    Ok((outcome, path))
}
