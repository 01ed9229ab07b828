//! JSON file sink for run output.
//!
//! Each run is written to its own file named after the UTC time it was
//! written at, e.g. `members-20240314T091502.123Z.json`. An existing file is
//! never replaced; a numeric suffix is added instead.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rosterwalk_core::{MemberRecord, RecordSink, RosterDocument};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{create_json, default_output_dir, ensure_dir, load_json};

/// Suffixes tried before giving up on finding a free name.
const MAX_SUFFIX: u32 = 999;

/// Writes one [`RosterDocument`] per run into a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the sink writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a run written at `at`; `attempt` 0 has no suffix.
    pub fn file_name(at: DateTime<Utc>, attempt: u32) -> String {
        let stamp = at.format("%Y%m%dT%H%M%S%.3fZ");
        if attempt == 0 {
            format!("members-{stamp}.json")
        } else {
            format!("members-{stamp}-{attempt}.json")
        }
    }

    /// Writes `records` as a document stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file cannot
    /// be written, or every candidate name is taken.
    pub async fn write_at(
        &self,
        at: DateTime<Utc>,
        records: &[MemberRecord],
        source_url: Option<&str>,
    ) -> Result<PathBuf, StoreError> {
        ensure_dir(&self.dir).await?;

        let document = RosterDocument::at(at, records.to_vec(), source_url.map(str::to_string));

        for attempt in 0..=MAX_SUFFIX {
            let path = self.dir.join(Self::file_name(at, attempt));
            match create_json(&path, &document).await {
                Ok(()) => {
                    info!(path = %path.display(), count = document.count, "Wrote member document");
                    return Ok(path);
                }
                Err(StoreError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Output file exists, trying next name");
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::NoFreeName(self.dir.clone()))
    }
}

impl Default for JsonFileSink {
    fn default() -> Self {
        Self::new(default_output_dir())
    }
}

impl RecordSink for JsonFileSink {
    type Error = StoreError;

    async fn write(
        &self,
        records: &[MemberRecord],
        source_url: Option<&str>,
    ) -> Result<PathBuf, Self::Error> {
        self.write_at(Utc::now(), records, source_url).await
    }
}

/// Reads an output document back and checks it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub async fn load_document(path: &Path) -> Result<RosterDocument, StoreError> {
    let document: RosterDocument = load_json(path).await?;
    document.validate()?;
    Ok(document)
}
