//! The document written at the end of a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::MemberRecord;
use crate::error::CoreError;

/// Ordered member records of one run plus a little provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDocument {
    /// When the document was produced.
    pub generated_at: DateTime<Utc>,
    /// Page the members were read from.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Number of members, kept for readers that only want the total.
    pub count: usize,
    /// Records in traversal order.
    pub members: Vec<MemberRecord>,
}

impl RosterDocument {
    /// Creates a document stamped with the current time.
    pub fn new(members: Vec<MemberRecord>, source_url: Option<String>) -> Self {
        Self::at(Utc::now(), members, source_url)
    }

    /// Creates a document with an explicit timestamp.
    pub fn at(
        generated_at: DateTime<Utc>,
        members: Vec<MemberRecord>,
        source_url: Option<String>,
    ) -> Self {
        Self {
            generated_at,
            source_url,
            count: members.len(),
            members,
        }
    }

    /// Returns true if the document holds no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Checks the count and the index ordering of the members.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] if `count` disagrees with the member
    /// list, or [`CoreError::OutOfOrder`] if indices are not strictly increasing.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.count != self.members.len() {
            return Err(CoreError::InvalidData(format!(
                "count is {} but document holds {} members",
                self.count,
                self.members.len()
            )));
        }

        for pair in self.members.windows(2) {
            if pair[1].index <= pair[0].index {
                return Err(CoreError::OutOfOrder {
                    index: pair[1].index,
                    previous: pair[0].index,
                });
            }
        }

        Ok(())
    }

    /// Parses and validates a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a document or fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let document: Self = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }
}
