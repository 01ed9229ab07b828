//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document was read but is not valid.
    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] rosterwalk_core::CoreError),

    /// No free file name was found for a new output file.
    #[error("No free output file name in {}", .0.display())]
    NoFreeName(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::NoFreeName(_))
    }
}
