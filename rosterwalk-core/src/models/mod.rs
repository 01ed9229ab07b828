//! Domain models for rosterwalk.
//!
//! ## Submodules
//!
//! - [`member`] - The per-member record emitted by a traversal
//! - [`status`] - Presence states read from member rows
//! - [`traversal`] - Mutable state owned by one traversal run
//! - [`document`] - The document written at the end of a run

pub mod document;
pub mod member;
pub mod status;
pub mod traversal;

pub use document::RosterDocument;
pub use member::{MemberRecord, UNKNOWN_DISPLAY_NAME};
pub use status::PresenceStatus;
pub use traversal::TraversalState;
