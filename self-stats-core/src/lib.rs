//! # self-stats-core
//!
//! Core library for self-stats - personal activity analytics over Google
//! Takeout search and watch history exports.
//!
//! This library provides:
//! - Domain types for events, activity windows and record types
//! - Takeout JSON and HTML ingestion with text and timestamp cleaning
//! - Leading-noise trimming via changepoint detection
//! - Activity window segmentation and window statistics
//! - Daily aggregation, summaries and CSV/JSON export
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Ingest:** Export files on disk become typed [`EventColumnSet`]s
//! - **Pipeline:** Events are sorted, trimmed and segmented into windows
//! - **Analytics:** Derived tables and summaries are built and exported
//!
//! ## Example
//!
//! ```rust,no_run
//! use self_stats_core::{Config, IngestCoordinator, Pipeline};
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let pipeline = Pipeline::from_config(&config);
//!
//! let loaded = IngestCoordinator::new()
//!     .load_all(Path::new("personal_data"))
//!     .expect("failed to load exports");
//! for export in loaded.exports {
//!     let output = pipeline.process(export.result.events).expect("pipeline failed");
//!     println!("{}: {} windows", output.record_type(), output.windows.len());
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{IngestCoordinator, LoadResult};
pub use pipeline::{Pipeline, PipelineOutput};
pub use table::{Column, EventColumnSet, Schema, Table};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod segmentation;
pub mod table;
pub mod types;
