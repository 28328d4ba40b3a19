//! Temporal segmentation of an event timeline
//!
//! Three stages, each consuming the previous one's output:
//!
//! 1. [`trim`] drops a leading noise period found by [`changepoint`] detection
//!    on daily event counts
//! 2. [`windowing`] splits the remaining timeline into activity windows at
//!    every gap longer than the interrupt threshold
//! 3. [`window_stats`] measures each window's duration, size and rate

pub mod changepoint;
pub mod trim;
pub mod window_stats;
pub mod windowing;

pub use changepoint::{daily_counts, detect_changepoint, Changepoint, ChangepointDetector};
pub use trim::trim_leading_noise;
pub use window_stats::{compute_window_stats, rate_per_10min, WindowStats};
pub use windowing::{compute_gaps, compute_windows, windows_from_gaps, Segmentation};
