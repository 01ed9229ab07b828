//! Member record type.

use serde::{Deserialize, Serialize};

use super::status::PresenceStatus;

/// Display name used when a row carries no readable label.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// One successfully processed member row.
///
/// Field names on the wire are fixed (`displayName`, `userID`, ...) so the
/// exported documents stay readable by tools that consumed earlier exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Traversal position this record was produced at.
    pub index: u32,
    /// Label read from the list row.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Account handle, only available from the detail overlay.
    #[serde(default)]
    pub username: Option<String>,
    /// Numeric account identifier.
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Presence read from the row.
    #[serde(default)]
    pub status: Option<PresenceStatus>,
}

impl MemberRecord {
    /// Creates a record with only the index and display name set.
    ///
    /// A blank display name is replaced by [`UNKNOWN_DISPLAY_NAME`].
    pub fn new(index: u32, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            UNKNOWN_DISPLAY_NAME.to_string()
        } else {
            display_name.trim().to_string()
        };

        Self {
            index,
            display_name,
            username: None,
            user_id: None,
            avatar: None,
            status: None,
        }
    }

    /// Returns true if the display name is the placeholder.
    pub fn has_unknown_name(&self) -> bool {
        self.display_name == UNKNOWN_DISPLAY_NAME
    }

    /// Returns true if the overlay contributed an account handle.
    pub fn is_enriched(&self) -> bool {
        self.username.is_some()
    }

    /// Best label for display: username if known, display name otherwise.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.display_name)
    }
}
