//! Direct navigation to a member's profile page.

use tracing::{info, instrument, warn};

use crate::context::WalkContext;
use crate::error::{DomError, WalkError};
use crate::host::DomSession;

/// Navigates to the profile of `user_id` and waits for it to render.
///
/// # Errors
///
/// [`WalkError::SignedOut`] if the login form shows up instead,
/// [`WalkError::InvalidUrl`] for an id that is not numeric, or a session
/// error if navigation fails or nothing appears in time.
#[instrument(skip(ctx, session))]
pub async fn open_profile<S: DomSession + ?Sized>(
    ctx: &WalkContext,
    session: &mut S,
    user_id: &str,
) -> Result<String, WalkError> {
    if user_id.is_empty() || !user_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalkError::InvalidUrl(format!("not a user id: {user_id}")));
    }

    let settings = &ctx.settings;
    let url = settings.profile_url(user_id);
    session.navigate(&url, settings.navigation_timeout).await?;

    let interval = settings.poll_interval.max(std::time::Duration::from_millis(1));
    let polls = (settings.profile_timeout.as_millis() / interval.as_millis()).max(1);

    for _ in 0..polls {
        if session.exists(&settings.selectors.login_marker).await? {
            warn!("Redirected to the login page");
            return Err(WalkError::SignedOut);
        }
        if session.exists(&settings.selectors.profile_marker).await? {
            info!("Profile loaded");
            return Ok(url);
        }
        ctx.pacer.pause(interval).await;
    }

    Err(DomError::Timeout {
        selector: settings.selectors.profile_marker.clone(),
        timeout: settings.profile_timeout,
    }
    .into())
}
