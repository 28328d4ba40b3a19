//! Per-day activity aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::table::{Column, EventColumnSet, Schema, Table};
use crate::types::{round_to, DATE_COLUMN, GAP_COLUMN, SHORT_FORM_COLUMN};

/// Column holding the number of events per day.
pub const COUNT_COLUMN: &str = "Count";
/// Column holding short-form / long-form videos per day.
pub const SHORT_FORM_RATIO_COLUMN: &str = "Short-Form Ratio";

/// Activity on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: usize,
    /// Short-form over long-form videos; `None` without long-form videos
    /// or for records that carry no short-form flag
    pub short_form_ratio: Option<f64>,
}

#[derive(Default)]
struct DayTally {
    count: usize,
    short_form: usize,
    long_form: usize,
}

/// Aggregate events into one row per day, first to last active date.
///
/// Days without events appear with a zero count. Events whose gap is null
/// are neither short-form nor long-form.
pub fn aggregate_daily(events: &EventColumnSet) -> Vec<DailyActivity> {
    let timestamps = events.timestamps();
    let flags = match events.column(SHORT_FORM_COLUMN) {
        Some(Column::Bool(flags)) => Some(flags),
        _ => None,
    };
    let gaps = match events.column(GAP_COLUMN) {
        Some(Column::Float(gaps)) => Some(gaps),
        _ => None,
    };

    let mut tallies: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let tally = tallies.entry(ts.date()).or_default();
        tally.count += 1;

        if let (Some(flags), Some(gaps)) = (flags, gaps) {
            if gaps[i].is_some() {
                if flags[i] {
                    tally.short_form += 1;
                } else {
                    tally.long_form += 1;
                }
            }
        }
    }

    let (Some(&first), Some(&last)) = (tallies.keys().next(), tallies.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let tally = tallies.remove(&date).unwrap_or_default();
            let short_form_ratio = if flags.is_some() && tally.long_form > 0 {
                Some(round_to(
                    tally.short_form as f64 / tally.long_form as f64,
                    3,
                ))
            } else {
                None
            };
            DailyActivity {
                date,
                count: tally.count,
                short_form_ratio,
            }
        })
        .collect()
}

/// Build the daily table; the ratio column is included only when
/// `with_short_form_ratio` is set.
pub fn daily_table(days: &[DailyActivity], with_short_form_ratio: bool) -> Table {
    let mut names = vec![DATE_COLUMN, COUNT_COLUMN];
    let mut columns = vec![
        Column::Date(days.iter().map(|d| d.date).collect()),
        Column::Int(days.iter().map(|d| d.count as i64).collect()),
    ];
    if with_short_form_ratio {
        names.push(SHORT_FORM_RATIO_COLUMN);
        columns.push(Column::Float(
            days.iter().map(|d| d.short_form_ratio).collect(),
        ));
    }
    // Columns are built from one slice, so lengths always agree
    Table::new(Schema::new(names), columns)
        .unwrap_or_else(|e| unreachable!("daily table columns disagree: {}", e))
}
