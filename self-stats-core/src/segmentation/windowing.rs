//! Gap-based activity windows.
//!
//! Consecutive events no more than `interrupt_minutes` apart belong to the
//! same window. An event separated from both neighbours by a break belongs to
//! no window.

use crate::types::{round_to, WindowBounds};
use chrono::NaiveDateTime;

/// Gaps and window boundaries for one sorted event sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Minutes since the previous event; `None` for the first event and
    /// across every interruption. Same length as the input.
    pub gaps: Vec<Option<f64>>,
    /// Windows in chronological order, never overlapping
    pub windows: Vec<WindowBounds>,
}

/// Absolute minutes between two timestamps, rounded to 2 decimals.
pub fn minutes_between(previous: NaiveDateTime, current: NaiveDateTime) -> f64 {
    let millis = current.signed_duration_since(previous).num_milliseconds();
    round_to((millis as f64 / 60_000.0).abs(), 2)
}

/// Per-event gap to the previous event, nulled above the threshold.
pub fn compute_gaps(timestamps: &[NaiveDateTime], interrupt_minutes: u32) -> Vec<Option<f64>> {
    let limit = f64::from(interrupt_minutes);
    let mut gaps = Vec::with_capacity(timestamps.len());
    if timestamps.is_empty() {
        return gaps;
    }

    gaps.push(None);
    for pair in timestamps.windows(2) {
        let minutes = minutes_between(pair[0], pair[1]);
        gaps.push((minutes <= limit).then_some(minutes));
    }
    gaps
}

/// Window boundaries from a gap sequence.
///
/// A non-null gap at `i` links event `i - 1` to event `i`, so a run of
/// non-null gaps over `i..=j` is one window spanning events `i - 1..=j`.
pub fn windows_from_gaps(gaps: &[Option<f64>]) -> Vec<WindowBounds> {
    let mut windows = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, gap) in gaps.iter().enumerate().skip(1) {
        match (gap.is_some(), run_start) {
            (true, None) => run_start = Some(i - 1),
            (false, Some(start)) => {
                push_window(&mut windows, start, i - 1);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_window(&mut windows, start, gaps.len() - 1);
    }

    windows
}

fn push_window(windows: &mut Vec<WindowBounds>, start_index: usize, end_index: usize) {
    if start_index < end_index {
        windows.push(WindowBounds {
            start_index,
            end_index,
        });
    }
}

/// Gaps plus windows for a sorted timestamp sequence.
pub fn compute_windows(timestamps: &[NaiveDateTime], interrupt_minutes: u32) -> Segmentation {
    debug_assert!(
        timestamps.windows(2).all(|w| w[0] <= w[1]),
        "timestamps must be sorted"
    );
    let gaps = compute_gaps(timestamps, interrupt_minutes);
    let windows = windows_from_gaps(&gaps);

    tracing::debug!(
        events = timestamps.len(),
        windows = windows.len(),
        interrupt_minutes,
        "Computed activity windows"
    );

    Segmentation { gaps, windows }
}
