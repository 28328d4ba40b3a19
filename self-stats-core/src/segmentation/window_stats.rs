//! Per-window duration, size and activity rate.

use crate::types::{round_to, ActivityWindow, WindowBounds};
use chrono::NaiveDateTime;

/// Window statistics as parallel sequences, ordered like the input windows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowStats {
    /// Minutes from first to last event, rounded to 3 decimals
    pub durations: Vec<f64>,
    pub start_timestamps: Vec<NaiveDateTime>,
    pub counts: Vec<usize>,
    /// Events per 10 minutes, rounded to 3 decimals
    pub rates_per_10min: Vec<Option<f64>>,
}

impl WindowStats {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Zip the statistics back onto their window boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `windows` is not the sequence these stats were computed from.
    pub fn into_windows(self, windows: &[WindowBounds]) -> Vec<ActivityWindow> {
        assert_eq!(windows.len(), self.len(), "window/stat length mismatch");
        windows
            .iter()
            .zip(self.durations)
            .zip(self.start_timestamps)
            .zip(self.counts)
            .zip(self.rates_per_10min)
            .map(
                |((((bounds, duration_minutes), start_timestamp), event_count), rate_per_10min)| {
                    ActivityWindow {
                        start_index: bounds.start_index,
                        end_index: bounds.end_index,
                        start_timestamp,
                        duration_minutes,
                        event_count,
                        rate_per_10min,
                    }
                },
            )
            .collect()
    }
}

/// Events per 10 minutes.
///
/// `None` when the window has no duration, and always `None` for two-event
/// windows: a pair of quick clicks says nothing about a sustained rate and
/// would dominate aggregate rate statistics.
pub fn rate_per_10min(event_count: usize, duration_minutes: f64) -> Option<f64> {
    if event_count == 2 || duration_minutes <= 0.0 {
        return None;
    }
    Some(round_to(10.0 * (event_count as f64 / duration_minutes), 3))
}

/// Statistics for each window over the sorted timestamps.
///
/// # Panics
///
/// Panics if a window index is out of range for `timestamps`.
pub fn compute_window_stats(timestamps: &[NaiveDateTime], windows: &[WindowBounds]) -> WindowStats {
    let mut stats = WindowStats {
        durations: Vec::with_capacity(windows.len()),
        start_timestamps: Vec::with_capacity(windows.len()),
        counts: Vec::with_capacity(windows.len()),
        rates_per_10min: Vec::with_capacity(windows.len()),
    };

    for window in windows {
        let start = timestamps[window.start_index];
        let end = timestamps[window.end_index];
        let millis = end.signed_duration_since(start).num_milliseconds();
        let duration = round_to(millis as f64 / 60_000.0, 3);
        let count = window.len();

        stats.durations.push(duration);
        stats.start_timestamps.push(start);
        stats.counts.push(count);
        stats.rates_per_10min.push(rate_per_10min(count, duration));
    }

    stats
}
