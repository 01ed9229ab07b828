//! Revealing a collapsed member list.

use tracing::{debug, info, warn};

use crate::context::WalkContext;
use crate::error::DomError;
use crate::host::DomSession;

/// Makes sure the member list is shown.
///
/// Does nothing if the list is already present. Otherwise clicks the reveal
/// control and waits for the list. Failures are logged and swallowed; only
/// fatal session errors are returned.
///
/// # Errors
///
/// Returns a [`DomError`] only if the session became unusable.
pub async fn ensure_list_visible<S: DomSession + ?Sized>(
    ctx: &WalkContext,
    session: &mut S,
) -> Result<(), DomError> {
    let selectors = ctx.selectors();

    match session.exists(&selectors.member_list).await {
        Ok(true) => {
            debug!("Member list already visible");
            return Ok(());
        }
        Ok(false) => {}
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => debug!(error = %e, "Could not check for member list"),
    }

    info!("Expanding member list");
    let revealed = async {
        session
            .wait_for(&selectors.show_member_list, ctx.settings.list_timeout)
            .await?;
        session.click_selector(&selectors.show_member_list).await?;
        session
            .wait_for(&selectors.member_list, ctx.settings.list_timeout)
            .await
    }
    .await;

    match revealed {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(error = %e, "Continuing without expanding the member list");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{Call, FakeSession};

    fn ctx() -> WalkContext {
        WalkContext::with_settings(crate::context::WalkSettings::without_pauses())
    }

    #[tokio::test]
    async fn test_visible_list_is_left_alone() {
        let mut session = FakeSession::with_members(1);
        ensure_list_visible(&ctx(), &mut session).await.unwrap();
        assert!(session.calls.is_empty());
    }

    #[tokio::test]
    async fn test_hidden_list_is_revealed() {
        let ctx = ctx();
        let mut session = FakeSession::with_members(1);
        session.list_visible = false;
        session.show_button_present = true;

        ensure_list_visible(&ctx, &mut session).await.unwrap();
        assert!(session.list_visible);
        assert_eq!(
            session.count(&Call::ClickSelector(ctx.selectors().show_member_list.clone())),
            1
        );

        // Second call sees the list and does nothing.
        ensure_list_visible(&ctx, &mut session).await.unwrap();
        assert_eq!(session.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_control_is_not_an_error() {
        let mut session = FakeSession::with_members(1);
        session.list_visible = false;

        ensure_list_visible(&ctx(), &mut session).await.unwrap();
        assert!(!session.list_visible);
    }
}
