//! Presence status read from member rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence state shown next to a member in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Online.
    Online,
    /// Idle / away.
    Idle,
    /// Do not disturb.
    #[serde(rename = "dnd")]
    DoNotDisturb,
    /// Streaming.
    Streaming,
    /// Offline or invisible.
    Offline,
}

impl PresenceStatus {
    /// Parses the accessible label of a status indicator.
    ///
    /// Labels look like `"Online"`, `"Idle"`, `"Do Not Disturb"`, or
    /// `"Online via Mobile"`. Unrecognized labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }

        if label.contains("do not disturb") || label == "dnd" {
            Some(Self::DoNotDisturb)
        } else if label.starts_with("streaming") {
            Some(Self::Streaming)
        } else if label.starts_with("online") {
            Some(Self::Online)
        } else if label.starts_with("idle") {
            Some(Self::Idle)
        } else if label.starts_with("offline") || label.starts_with("invisible") {
            Some(Self::Offline)
        } else {
            None
        }
    }

    /// Returns the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Idle => "Idle",
            Self::DoNotDisturb => "Do Not Disturb",
            Self::Streaming => "Streaming",
            Self::Offline => "Offline",
        }
    }

    /// Returns true for every state except offline.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(PresenceStatus::from_label("Online"), Some(PresenceStatus::Online));
        assert_eq!(PresenceStatus::from_label("Online via Mobile"), Some(PresenceStatus::Online));
        assert_eq!(PresenceStatus::from_label("Idle"), Some(PresenceStatus::Idle));
        assert_eq!(
            PresenceStatus::from_label("Do Not Disturb"),
            Some(PresenceStatus::DoNotDisturb)
        );
        assert_eq!(PresenceStatus::from_label("Streaming"), Some(PresenceStatus::Streaming));
        assert_eq!(PresenceStatus::from_label(" offline "), Some(PresenceStatus::Offline));
    }

    #[test]
    fn test_from_label_unknown() {
        assert_eq!(PresenceStatus::from_label(""), None);
        assert_eq!(PresenceStatus::from_label("Avatar"), None);
    }

    #[test]
    fn test_is_present() {
        assert!(PresenceStatus::Idle.is_present());
        assert!(!PresenceStatus::Offline.is_present());
    }
}
