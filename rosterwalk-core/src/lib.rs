// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `rosterwalk` Core
//!
//! Core types, models, and traits shared by every `rosterwalk` crate.
//!
//! - Domain models (member records, presence, traversal state)
//! - The exported document format
//! - Error types
//! - The [`RecordSink`] trait implemented by persistence backends
//!
//! ## Key Types
//!
//! - [`MemberRecord`] - One extracted member, tagged with its list index
//! - [`PresenceStatus`] - Presence state read from a member row
//! - [`TraversalState`] - Cursor, failure counter, and the ordered result
//! - [`RosterDocument`] - The per-run output document

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;

pub use models::{MemberRecord, PresenceStatus, RosterDocument, TraversalState, UNKNOWN_DISPLAY_NAME};

pub use traits::RecordSink;
