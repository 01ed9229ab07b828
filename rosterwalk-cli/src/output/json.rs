//! JSON output formatting.

use anyhow::Result;
use rosterwalk_core::RosterDocument;
use serde::Serialize;

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a document, keeping at most `limit` members.
    ///
    /// The output is itself a valid document; `count` matches what is shown.
    pub fn format_document(&self, document: &RosterDocument, limit: Option<usize>) -> Result<String> {
        match limit {
            Some(limit) if limit < document.members.len() => {
                let shown = RosterDocument::at(
                    document.generated_at,
                    document.members[..limit].to_vec(),
                    document.source_url.clone(),
                );
                self.format(&shown)
            }
            _ => self.format(document),
        }
    }
}
