//! Analytics over processed exports
//!
//! Provides aggregate statistics including:
//! - Zero-padded per-day activity with the short-form ratio
//! - Activity summaries (totals, time patterns, streaks)

pub mod daily;
pub mod summary;

pub use daily::{aggregate_daily, daily_table, DailyActivity};
pub use summary::{summarize, ActivitySummary, StreakStats, TimePatterns, TotalStats};
