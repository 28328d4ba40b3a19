//! Leading-noise trimming.
//!
//! Exports often open with a sparse stretch (an account's first weeks, a
//! half-synced device) that skews per-day statistics. The trimmer finds the
//! first day of the dominant activity regime and drops every earlier row.

use super::changepoint::{daily_counts, ChangepointDetector};
use crate::table::EventColumnSet;

/// Drop rows dated before the detected changepoint.
///
/// Returns the input unchanged when there is no significant changepoint
/// (including the empty set). Rows keep their relative order, and the same
/// mask is applied to every column.
pub fn trim_leading_noise(events: EventColumnSet, detector: &ChangepointDetector) -> EventColumnSet {
    if events.is_empty() {
        return events;
    }

    let counts = daily_counts(events.timestamps());
    let Some(changepoint) = detector.detect(&counts) else {
        tracing::debug!(
            record_type = %events.record_type(),
            days = counts.len(),
            "No significant changepoint, keeping all rows"
        );
        return events;
    };

    let mask: Vec<bool> = events
        .timestamps()
        .iter()
        .map(|ts| ts.date() >= changepoint.date)
        .collect();
    let trimmed = events.filter(&mask);

    tracing::info!(
        record_type = %events.record_type(),
        changepoint = %changepoint.date,
        relative_change = changepoint.relative_change,
        removed = events.len() - trimmed.len(),
        kept = trimmed.len(),
        "Trimmed leading noise"
    );

    trimmed
}
