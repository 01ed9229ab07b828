//! Trait definitions for rosterwalk.
//!
//! The traversal engine produces records; where they end up is decided by a
//! [`RecordSink`] implementation chosen by the caller.

use std::path::PathBuf;

use crate::models::MemberRecord;

/// Destination for the ordered records of one run.
///
/// Implementors are responsible for:
/// - Creating whatever containing structure they need (directories, tables)
/// - Choosing a name that cannot collide with an earlier run
/// - Preserving record order exactly
pub trait RecordSink: Send + Sync {
    /// Error produced when the write fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes one run's records and returns the location they were written to.
    ///
    /// `source_url` is the page the records were read from, when known.
    fn write(
        &self,
        records: &[MemberRecord],
        source_url: Option<&str>,
    ) -> impl std::future::Future<Output = Result<PathBuf, Self::Error>> + Send;
}
