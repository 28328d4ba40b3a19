//! Single changepoint detection over daily event counts.
//!
//! Binary segmentation with an L2 (squared error around the segment mean)
//! cost, asked for exactly one breakpoint, followed by a relative-change
//! gate that rejects shifts too small to matter.

use crate::config::ChangepointConfig;
use crate::types::DailyCount;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// An accepted level shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Changepoint {
    /// Position in the daily-count sequence of the first day of the new regime
    pub index: usize,
    /// First day of the new regime
    pub date: NaiveDate,
    /// Mean daily count before `index`
    pub pre_mean: f64,
    /// Mean daily count from `index` onward
    pub post_mean: f64,
    /// `|post - pre| / pre`; infinite when `pre_mean` is zero
    pub relative_change: f64,
}

/// Count events per calendar date, ordered by date.
pub fn daily_counts(timestamps: &[NaiveDateTime]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in timestamps {
        *counts.entry(ts.date()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Prefix sums for O(1) segment cost queries.
struct L2Cost {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl L2Cost {
    fn fit(signal: &[f64]) -> Self {
        let mut sum = Vec::with_capacity(signal.len() + 1);
        let mut sum_sq = Vec::with_capacity(signal.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for &x in signal {
            sum.push(sum[sum.len() - 1] + x);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + x * x);
        }
        Self { sum, sum_sq }
    }

    /// Sum of squared deviations from the mean over `[start, end)`.
    fn error(&self, start: usize, end: usize) -> f64 {
        let n = (end - start) as f64;
        if n == 0.0 {
            return 0.0;
        }
        let s = self.sum[end] - self.sum[start];
        let sq = self.sum_sq[end] - self.sum_sq[start];
        (sq - s * s / n).max(0.0)
    }

    fn mean(&self, start: usize, end: usize) -> f64 {
        (self.sum[end] - self.sum[start]) / (end - start) as f64
    }
}

/// Binary segmentation asked for one breakpoint.
///
/// Returns the split index maximizing the cost reduction, i.e. the first
/// position of the second segment. Candidates are multiples of `jump`
/// leaving at least `min_segment_len` values on each side; ties keep the
/// earliest candidate.
fn best_split(cost: &L2Cost, n: usize, min_segment_len: usize, jump: usize) -> Option<usize> {
    let total = cost.error(0, n);
    let mut best: Option<(f64, usize)> = None;

    let first = min_segment_len.max(1);
    let last = n.checked_sub(min_segment_len)?;
    for split in first..=last {
        if split % jump != 0 {
            continue;
        }
        let gain = total - cost.error(0, split) - cost.error(split, n);
        match best {
            Some((best_gain, _)) if gain <= best_gain => {}
            _ => best = Some((gain, split)),
        }
    }

    best.map(|(_, split)| split)
}

/// Detects the most significant level shift in a daily count sequence.
#[derive(Debug, Clone, Default)]
pub struct ChangepointDetector {
    config: ChangepointConfig,
}

impl ChangepointDetector {
    pub fn new(config: ChangepointConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChangepointConfig {
        &self.config
    }

    /// Find and test the single best changepoint.
    ///
    /// Returns `None` when the sequence is too short to split or when the
    /// relative change in mean level does not exceed the configured
    /// threshold. A zero pre-change mean counts as an infinite change.
    pub fn detect(&self, counts: &[DailyCount]) -> Option<Changepoint> {
        let n = counts.len();
        if n < 2 {
            return None;
        }

        let signal: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
        let cost = L2Cost::fit(&signal);
        let split = best_split(
            &cost,
            n,
            self.config.min_segment_len,
            self.config.jump.max(1),
        )?;
        // Changepoint at 0 would trim nothing
        if split == 0 || split >= n {
            return None;
        }

        let pre_mean = cost.mean(0, split);
        let post_mean = cost.mean(split, n);
        let relative_change = if pre_mean == 0.0 {
            f64::INFINITY
        } else {
            (post_mean - pre_mean).abs() / pre_mean
        };

        tracing::debug!(
            split,
            pre_mean,
            post_mean,
            relative_change,
            threshold = self.config.min_relative_change,
            "Changepoint candidate"
        );

        if relative_change > self.config.min_relative_change {
            Some(Changepoint {
                index: split,
                date: counts[split].date,
                pre_mean,
                post_mean,
                relative_change,
            })
        } else {
            None
        }
    }
}

/// Date of the first day after a significant level shift, if any.
///
/// `min_relative_change` is fractional: `0.1` requires a 10% change.
pub fn detect_changepoint(counts: &[DailyCount], min_relative_change: f64) -> Option<NaiveDate> {
    ChangepointDetector::new(ChangepointConfig::with_threshold(min_relative_change))
        .detect(counts)
        .map(|cp| cp.date)
}
