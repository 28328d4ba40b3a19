//! Activity summary
//!
//! Condenses one processed export into totals, time-of-day patterns and
//! streaks for the terminal, markdown and JSON reports.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use crate::pipeline::PipelineOutput;
use crate::types::{round_to, ActivityWindow, RecordType};

/// Complete summary for one record type.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub record_type: RecordType,
    /// Aggregate totals
    pub totals: TotalStats,
    /// Time-based patterns
    pub time_patterns: TimePatterns,
    /// Streak statistics
    pub streaks: StreakStats,
}

/// Aggregate totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalStats {
    /// Events left after trimming
    pub events: usize,
    /// Rows removed as leading noise
    pub rows_trimmed: usize,
    /// Number of activity windows
    pub windows: usize,
    /// Minutes spent inside activity windows
    pub window_minutes: f64,
    /// Events per 10 minutes averaged over windows that have a rate
    pub mean_rate_per_10min: Option<f64>,
}

impl TotalStats {
    /// Format window time for display (e.g., "12h 5m").
    pub fn duration_display(&self) -> String {
        let total = self.window_minutes.round() as i64;
        let hours = total / 60;
        let mins = total % 60;
        if hours > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}m", mins)
        }
    }
}

/// Time-based activity patterns.
#[derive(Debug, Clone, Serialize)]
pub struct TimePatterns {
    /// Activity count by hour (0-23)
    pub hourly_distribution: [usize; 24],
    /// Activity count by day of week (0=Sunday, 6=Saturday)
    pub daily_distribution: [usize; 7],
    /// Peak hour (0-23)
    pub peak_hour: u8,
    /// Busiest day (0=Sunday)
    pub busiest_day: u8,
    /// Quietest day with any activity (0=Sunday)
    pub quietest_day: u8,
    /// Longest single activity window
    pub longest_window: Option<ActivityWindow>,
}

impl Default for TimePatterns {
    fn default() -> Self {
        Self {
            hourly_distribution: [0; 24],
            daily_distribution: [0; 7],
            peak_hour: 0,
            busiest_day: 0,
            quietest_day: 0,
            longest_window: None,
        }
    }
}

impl TimePatterns {
    /// Get day name from index.
    pub fn day_name(day: u8) -> &'static str {
        match day {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Unknown",
        }
    }

    /// Get hour display (e.g., "10am–11am").
    pub fn hour_display(hour: u8) -> String {
        let h = hour % 12;
        let h = if h == 0 { 12 } else { h };
        let period = if hour < 12 { "am" } else { "pm" };
        let next_h = (hour + 1) % 12;
        let next_h = if next_h == 0 { 12 } else { next_h };
        let next_period = if (hour + 1) % 24 < 12 { "am" } else { "pm" };
        format!("{}{}–{}{}", h, period, next_h, next_period)
    }
}

/// Streak statistics over active calendar days.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreakStats {
    /// Longest run of consecutive active days
    pub longest_streak_days: usize,
    pub longest_streak_start: Option<NaiveDate>,
    pub longest_streak_end: Option<NaiveDate>,
    /// Days with at least one event
    pub active_days: usize,
    /// Days from first to last event, inclusive
    pub total_days: usize,
}

impl StreakStats {
    /// Calculate activity percentage.
    pub fn activity_percentage(&self) -> f64 {
        if self.total_days == 0 {
            0.0
        } else {
            (self.active_days as f64 / self.total_days as f64) * 100.0
        }
    }
}

/// Summarize one processed export.
pub fn summarize(output: &PipelineOutput) -> ActivitySummary {
    let timestamps = output.events.timestamps();

    let window_minutes: f64 = output.windows.iter().map(|w| w.duration_minutes).sum();
    let rates: Vec<f64> = output
        .windows
        .iter()
        .filter_map(|w| w.rate_per_10min)
        .collect();
    let mean_rate_per_10min = if rates.is_empty() {
        None
    } else {
        Some(round_to(rates.iter().sum::<f64>() / rates.len() as f64, 3))
    };

    let totals = TotalStats {
        events: timestamps.len(),
        rows_trimmed: output.rows_trimmed,
        windows: output.windows.len(),
        window_minutes: round_to(window_minutes, 3),
        mean_rate_per_10min,
    };

    let mut hourly_distribution = [0usize; 24];
    let mut daily_distribution = [0usize; 7];
    for ts in timestamps {
        hourly_distribution[ts.hour() as usize] += 1;
        daily_distribution[ts.weekday().num_days_from_sunday() as usize] += 1;
    }

    // Ties resolve to the earliest slot
    let peak_hour = argmax(&hourly_distribution).unwrap_or(0) as u8;
    let busiest_day = argmax(&daily_distribution).unwrap_or(0) as u8;
    let quietest_day = daily_distribution
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .fold(None::<(usize, usize)>, |best, (day, &count)| match best {
            Some((_, best_count)) if best_count <= count => best,
            _ => Some((day, count)),
        })
        .map(|(day, _)| day as u8)
        .unwrap_or(0);

    let longest_window = output
        .windows
        .iter()
        .fold(None::<&ActivityWindow>, |best, w| match best {
            Some(b) if b.duration_minutes >= w.duration_minutes => Some(b),
            _ => Some(w),
        })
        .cloned();

    let mut dates: Vec<NaiveDate> = timestamps.iter().map(|ts| ts.date()).collect();
    dates.dedup();

    ActivitySummary {
        record_type: output.record_type(),
        totals,
        time_patterns: TimePatterns {
            hourly_distribution,
            daily_distribution,
            peak_hour,
            busiest_day,
            quietest_day,
            longest_window,
        },
        streaks: streak_stats(&dates),
    }
}

/// Index of the first maximum among non-zero slots.
fn argmax(counts: &[usize]) -> Option<usize> {
    counts
        .iter()
        .enumerate()
        .fold(None::<(usize, usize)>, |best, (i, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ if count == 0 => best,
            _ => Some((i, count)),
        })
        .map(|(i, _)| i)
}

/// Streaks over sorted, de-duplicated active dates.
fn streak_stats(dates: &[NaiveDate]) -> StreakStats {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return StreakStats::default();
    };

    let mut best = (1usize, first, first);
    let mut run_start = first;
    let mut run_len = 1usize;
    for pair in dates.windows(2) {
        if pair[1].signed_duration_since(pair[0]).num_days() == 1 {
            run_len += 1;
        } else {
            run_start = pair[1];
            run_len = 1;
        }
        if run_len > best.0 {
            best = (run_len, run_start, pair[1]);
        }
    }

    StreakStats {
        longest_streak_days: best.0,
        longest_streak_start: Some(best.1),
        longest_streak_end: Some(best.2),
        active_days: dates.len(),
        total_days: (last.signed_duration_since(first).num_days() + 1) as usize,
    }
}
