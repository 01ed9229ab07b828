//! Detail-view extraction for one list row.
//!
//! Row-local values are read first and act as the fallback; the overlay adds
//! the account handle and the authoritative account id.

use rosterwalk_core::{MemberRecord, PresenceStatus};
use tracing::{debug, instrument, trace};

use crate::context::WalkContext;
use crate::error::ExtractError;
use crate::host::{DomSession, OverlaySnapshot, RowHandle, RowSnapshot};
use crate::overlay::Overlay;
use crate::parse::{clean_text, user_id_from_avatar, user_id_from_profile_href};

/// Produces a [`MemberRecord`] from a resolved row.
#[derive(Debug, Clone, Copy)]
pub struct DetailExtractor<'a> {
    ctx: &'a WalkContext,
}

impl<'a> DetailExtractor<'a> {
    /// Creates an extractor.
    pub fn new(ctx: &'a WalkContext) -> Self {
        Self { ctx }
    }

    /// Extracts one record.
    ///
    /// The overlay is dismissed and the UI given time to settle whatever the
    /// outcome, so the next row starts from the plain list.
    ///
    /// # Errors
    ///
    /// [`ExtractError::OverlayNotShown`] if the overlay never opened, or a
    /// DOM error if the row could not be read.
    #[instrument(skip(self, session, row), fields(index = row.index))]
    pub async fn extract<S: DomSession + ?Sized>(
        &self,
        session: &mut S,
        row: &RowHandle,
    ) -> Result<MemberRecord, ExtractError> {
        let mut overlay = Overlay::new();
        let result = self.extract_with(session, row, &mut overlay).await;

        overlay.dismiss(session, &self.ctx.settings.dismiss_key).await;
        self.ctx.pause(self.ctx.settings.settle_pause).await;

        result
    }

    async fn extract_with<S: DomSession + ?Sized>(
        &self,
        session: &mut S,
        row: &RowHandle,
        overlay: &mut Overlay,
    ) -> Result<MemberRecord, ExtractError> {
        let settings = &self.ctx.settings;

        if let Err(e) = session.hover(row).await {
            if e.is_fatal() {
                return Err(e.into());
            }
            debug!(error = %e, "Hover failed");
        }
        self.ctx.pause(settings.hover_pause).await;

        let row_fields = session.read_row(row).await?;
        trace!(?row_fields, "Read row");

        overlay.open(session, row, settings).await?;

        let overlay_fields = match overlay.read(session).await {
            Ok(Some(fields)) => Some(fields),
            Ok(None) => {
                debug!("Overlay vanished before it could be read");
                None
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                debug!(error = %e, "Overlay read failed");
                None
            }
        };

        Ok(merge_fields(row.index, &row_fields, overlay_fields.as_ref()))
    }
}

/// Combines row-local and overlay values into one record.
///
/// The overlay's account id wins over the one embedded in the row avatar.
pub fn merge_fields(
    index: u32,
    row: &RowSnapshot,
    overlay: Option<&OverlaySnapshot>,
) -> MemberRecord {
    let mut record = MemberRecord::new(index, row.display_name.as_deref().unwrap_or_default());

    let row_id = row.avatar.as_deref().and_then(user_id_from_avatar);
    let overlay_id = overlay
        .and_then(|o| o.profile_href.as_deref())
        .and_then(user_id_from_profile_href);

    record.user_id = overlay_id.or(row_id);
    record.username = overlay.and_then(|o| clean_text(o.username.as_deref()));
    record.avatar = clean_text(row.avatar.as_deref())
        .or_else(|| overlay.and_then(|o| clean_text(o.avatar.as_deref())));
    record.status = row
        .status_label
        .as_deref()
        .and_then(PresenceStatus::from_label);

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{Call, FakeSession};
    use crate::pacing::InstantPacer;
    use rosterwalk_core::UNKNOWN_DISPLAY_NAME;
    use std::sync::Arc;

    fn ctx() -> WalkContext {
        WalkContext::builder()
            .pacer(Arc::new(InstantPacer::new()))
            .build()
    }

    #[test]
    fn test_merge_prefers_overlay_id() {
        let row = RowSnapshot {
            display_name: Some("Ferris".into()),
            avatar: Some("https://cdn.discordapp.com/avatars/111111111/a.webp".into()),
            status_label: Some("Idle".into()),
        };
        let overlay = OverlaySnapshot {
            username: Some("ferris".into()),
            profile_href: Some("https://discord.com/users/222222222".into()),
            avatar: None,
        };

        let record = merge_fields(4, &row, Some(&overlay));
        assert_eq!(record.user_id.as_deref(), Some("222222222"));
        assert_eq!(record.username.as_deref(), Some("ferris"));
        assert_eq!(record.status, Some(PresenceStatus::Idle));
        assert_eq!(record.index, 4);
    }

    #[test]
    fn test_merge_falls_back_to_row_id() {
        let row = RowSnapshot {
            display_name: None,
            avatar: Some("https://cdn.discordapp.com/avatars/111111111/a.webp".into()),
            status_label: None,
        };

        let record = merge_fields(0, &row, None);
        assert_eq!(record.user_id.as_deref(), Some("111111111"));
        assert_eq!(record.display_name, UNKNOWN_DISPLAY_NAME);
        assert!(record.username.is_none());
        assert!(record.status.is_none());
    }

    #[test]
    fn test_merge_overlay_avatar_fallback() {
        let row = RowSnapshot::default();
        let overlay = OverlaySnapshot {
            avatar: Some("https://cdn.discordapp.com/avatars/333333333/b.png".into()),
            ..Default::default()
        };

        let record = merge_fields(1, &row, Some(&overlay));
        assert_eq!(
            record.avatar.as_deref(),
            Some("https://cdn.discordapp.com/avatars/333333333/b.png")
        );
        // Overlay avatar is not an id source.
        assert!(record.user_id.is_none());
    }

    #[tokio::test]
    async fn test_extract_full_record() {
        let ctx = ctx();
        let mut session = FakeSession::with_members(3);
        let row = RowHandle::new(2, "row-2");

        let record = DetailExtractor::new(&ctx).extract(&mut session, &row).await.unwrap();

        assert_eq!(record.display_name, "Member 2");
        assert_eq!(record.username.as_deref(), Some("member_2"));
        assert_eq!(record.user_id.as_deref(), Some("9002"));
        assert_eq!(record.status, Some(PresenceStatus::Online));
        assert!(!session.overlay_is_open());
        assert_eq!(session.calls.first(), Some(&Call::Hover(2)));
    }

    #[tokio::test]
    async fn test_extract_overlay_failure_unwinds() {
        let ctx = ctx();
        let mut session = FakeSession::with_members(3);
        session.row_mut(1).overlay_opens = false;
        let row = RowHandle::new(1, "row-1");

        let err = DetailExtractor::new(&ctx).extract(&mut session, &row).await.unwrap_err();

        assert!(matches!(err, ExtractError::OverlayNotShown { attempts: 2 }));
        assert_eq!(session.count(&Call::Click(1)), 2);
        assert_eq!(session.count(&Call::PressKey("Escape".into())), 1);
        assert!(!session.overlay_is_open());
    }

    #[tokio::test]
    async fn test_extract_vanished_overlay_keeps_row_values() {
        let ctx = ctx();
        let mut session = FakeSession::with_members(2);
        session.row_mut(0).overlay_vanishes = true;
        let row = RowHandle::new(0, "row-0");

        let record = DetailExtractor::new(&ctx).extract(&mut session, &row).await.unwrap();

        assert_eq!(record.display_name, "Member 0");
        assert!(record.username.is_none());
        assert_eq!(record.user_id.as_deref(), Some("1000"));
        assert!(!session.overlay_is_open());
    }
}
