// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `rosterwalk` Store
//!
//! Files on disk for `rosterwalk`.
//!
//! This crate provides:
//!
//! - **`JsonFileSink`**: A [`RecordSink`](rosterwalk_core::RecordSink) writing one
//!   timestamped document per run, never replacing an earlier one
//! - **Config**: The JSON configuration file and its conversion to engine settings
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use rosterwalk_core::RecordSink;
//! use rosterwalk_store::{Config, JsonFileSink};
//!
//! let config = Config::load()?;
//! let sink = JsonFileSink::new(config.general.output_dir());
//! let path = sink.write(&records, Some(url)).await?;
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod sink;

pub use config::{BrowserConfig, Config, GeneralConfig, LogLevel, WalkConfig};
pub use error::StoreError;
pub use persistence::{
    create_json, default_config_dir, default_config_path, default_data_dir, default_output_dir,
    ensure_dir, load_json,
};
pub use sink::{JsonFileSink, load_document};

#[cfg(test)]
mod persistence_tests;
