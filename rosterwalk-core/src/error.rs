//! Core error types for `rosterwalk`.

use thiserror::Error;

/// Core error type for `rosterwalk` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record was appended with an index that does not follow the last one.
    #[error("Record index {index} does not follow previous index {previous}")]
    OutOfOrder {
        /// Index of the rejected record.
        index: u32,
        /// Index of the last accepted record.
        previous: u32,
    },

    /// Invalid data in a document or record.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
