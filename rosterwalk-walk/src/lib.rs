// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `rosterwalk` Walk
//!
//! The member list traversal engine and the browser host it drives.
//!
//! ## Host APIs
//!
//! The [`host`] module abstracts the page:
//!
//! - [`host::DomSession`] - Navigation, index-addressed rows, overlay, scrolling
//! - [`host::chrome`] - A session over the Chrome DevTools Protocol
//!
//! ## Engine
//!
//! - [`traversal::TraversalController`] - Owns the cursor; probes, scrolls, stops
//! - [`extractor::DetailExtractor`] - Opens a row's overlay and merges its fields
//! - [`overlay::Overlay`] - Overlay state machine with guaranteed dismissal
//! - [`termination::TerminationDetector`] - End-of-list predicate
//! - [`pacing`] - Jittered pauses behind a swappable [`pacing::Pacer`]
//!
//! ## Example
//!
//! ```ignore
//! use rosterwalk_walk::{ChromeSession, ConnectOptions, WalkContext, scrape_members};
//!
//! let ctx = WalkContext::new();
//! let mut session = ChromeSession::connect(
//!     &ConnectOptions::attach("ws://127.0.0.1:9222/devtools/browser/..."),
//!     ctx.selectors().clone(),
//! )
//! .await?;
//!
//! let outcome = scrape_members(&ctx, &mut session, "https://discord.com/channels/1/2").await?;
//! println!("{} members", outcome.count());
//! ```

// Core modules
pub mod context;
pub mod error;
pub mod extractor;
pub mod host;
pub mod overlay;
pub mod pacing;
pub mod parse;
pub mod profile;
pub mod run;
pub mod termination;
pub mod traversal;
pub mod visibility;


// Re-export key types at crate root

// Errors
pub use error::{DomError, ExtractError, WalkError};

// Host APIs
pub use host::{
    ChromeSession, ConnectOptions, DomSession, OverlaySnapshot, RowHandle, RowSnapshot,
    ScrollMetrics,
};

// Engine
pub use context::{Selectors, WalkContext, WalkContextBuilder, WalkSettings};
pub use extractor::DetailExtractor;
pub use overlay::{Overlay, OverlayState};
pub use pacing::{InstantPacer, Jitter, Pacer, TokioPacer};
pub use termination::TerminationDetector;
pub use traversal::{StepOutcome, StopReason, TraversalController, WalkOutcome};

// Entry points
pub use profile::open_profile;
pub use run::{scrape_and_persist, scrape_members, validate_url};
pub use visibility::ensure_list_visible;
