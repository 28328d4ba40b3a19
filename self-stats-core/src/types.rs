//! Core domain types for self-stats
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | One exported user action (a search or a watched video) |
//! | **Record type** | Which export an event came from: search history or watch history |
//! | **Activity window** | A maximal run of events whose consecutive gaps stay within the interrupt threshold |
//! | **Interrupt threshold** | Longest gap in minutes still considered part of the same window |
//! | **Changepoint** | First day of a sustained shift in daily activity level |
//! | **Short-form video** | A watched video followed so quickly by the previous one that it was barely watched |

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================
// Column names
// ============================================

/// Timestamp column present in every event table.
pub const DATE_COLUMN: &str = "Date";
/// Search query text.
pub const TEXT_TITLE_COLUMN: &str = "Text Title";
/// Latitude of the coarse search location.
pub const LATITUDE_COLUMN: &str = "Latitude";
/// Longitude of the coarse search location.
pub const LONGITUDE_COLUMN: &str = "Longitude";
/// Watched video URL.
pub const VIDEO_URL_COLUMN: &str = "Video URL";
/// Watched video title.
pub const VIDEO_TITLE_COLUMN: &str = "Video Title";
/// Channel that published the watched video.
pub const CHANNEL_TITLE_COLUMN: &str = "Channel Title";

/// Day name derived from the timestamp.
pub const WEEKDAY_COLUMN: &str = "Weekday";
/// Hour of day (0-23) derived from the timestamp.
pub const HOUR_COLUMN: &str = "Hour";
/// Calendar date derived from the timestamp.
pub const DATE_ONLY_COLUMN: &str = "Date Only";
/// Minutes since the previous event, null across an interruption.
pub const GAP_COLUMN: &str = "Minutes Since Previous Action";
/// Watch-only flag for barely watched videos.
pub const SHORT_FORM_COLUMN: &str = "Short-Form Video";

/// Window metadata columns, in output order.
pub const WINDOW_START_DATE_COLUMN: &str = "Activity_Window_Start_Date";
pub const WINDOW_START_INDEX_COLUMN: &str = "Activity_Window_Start_Index";
pub const WINDOW_END_INDEX_COLUMN: &str = "Activity_Window_End_Index";
pub const WINDOW_DURATION_COLUMN: &str = "Activity_Window_Duration";
pub const WINDOW_ACTIONS_COLUMN: &str = "Actions_per_Activity_Window";
pub const WINDOW_RATE_COLUMN: &str = "Approximate_Actions_per_Minute";

// ============================================
// Record types
// ============================================

/// Which export a set of events came from.
///
/// Decided once at ingestion and carried with the data, never re-inferred
/// from column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Search history (`MyActivity.json` / `.html`)
    Search,
    /// Video watch history (`watch-history.json` / `.html`)
    Watch,
}

impl RecordType {
    /// All supported record types.
    pub const ALL: [RecordType; 2] = [RecordType::Search, RecordType::Watch];

    /// Returns the display name for this record type
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordType::Search => "Search History",
            RecordType::Watch => "Watch History",
        }
    }

    /// Returns the identifier used in output file names
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Search => "search_history",
            RecordType::Watch => "watch_history",
        }
    }

    /// Column names produced by ingest for this record type.
    pub fn default_columns(&self) -> &'static [&'static str] {
        match self {
            RecordType::Search => &[
                TEXT_TITLE_COLUMN,
                DATE_COLUMN,
                LATITUDE_COLUMN,
                LONGITUDE_COLUMN,
            ],
            RecordType::Watch => &[
                VIDEO_URL_COLUMN,
                VIDEO_TITLE_COLUMN,
                CHANNEL_TITLE_COLUMN,
                DATE_COLUMN,
            ],
        }
    }

    /// Columns identifying the record type; a table must carry at least one.
    pub fn discriminator_columns(&self) -> &'static [&'static str] {
        match self {
            RecordType::Search => &[TEXT_TITLE_COLUMN],
            RecordType::Watch => &[VIDEO_URL_COLUMN, VIDEO_TITLE_COLUMN],
        }
    }

    /// Whether events of this type get the short-form flag.
    pub fn flags_short_form(&self) -> bool {
        matches!(self, RecordType::Watch)
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" | "search_history" => Ok(RecordType::Search),
            "watch" | "watch_history" => Ok(RecordType::Watch),
            _ => Err(format!("unknown record type: {}", s)),
        }
    }
}

// ============================================
// Derived entities
// ============================================

/// Number of events on one calendar date.
///
/// Built fresh for changepoint detection; dates without events are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Boundaries of one activity window in the sorted event sequence.
///
/// Both indices are inclusive and `start_index < end_index` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Position of the chronologically first event of the window
    pub start_index: usize,
    /// Position of the chronologically last event of the window
    pub end_index: usize,
}

impl WindowBounds {
    /// Number of events covered by the window.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Windows always hold at least two events.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` falls inside the window.
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.end_index).contains(&index)
    }
}

/// One contiguous run of activity with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWindow {
    pub start_index: usize,
    pub end_index: usize,
    /// Timestamp of the first event
    pub start_timestamp: NaiveDateTime,
    /// Minutes between first and last event, rounded to 3 decimals
    pub duration_minutes: f64,
    pub event_count: usize,
    /// Events per 10 minutes; `None` for zero-length or two-event windows
    pub rate_per_10min: Option<f64>,
}

impl ActivityWindow {
    /// Index boundaries of this window.
    pub fn bounds(&self) -> WindowBounds {
        WindowBounds {
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_roundtrip() {
        for record_type in RecordType::ALL {
            let parsed: RecordType = record_type.as_str().parse().unwrap();
            assert_eq!(parsed, record_type);
        }
        assert_eq!("watch".parse::<RecordType>(), Ok(RecordType::Watch));
        assert!("browser".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_default_columns_carry_date() {
        assert_eq!(
            RecordType::Search.default_columns().iter().position(|c| *c == DATE_COLUMN),
            Some(1)
        );
        assert_eq!(
            RecordType::Watch.default_columns().iter().position(|c| *c == DATE_COLUMN),
            Some(3)
        );
    }

    #[test]
    fn test_window_bounds() {
        let bounds = WindowBounds {
            start_index: 3,
            end_index: 6,
        };
        assert_eq!(bounds.len(), 4);
        assert!(bounds.contains(3));
        assert!(bounds.contains(6));
        assert!(!bounds.contains(7));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.0 / 3.0, 3), 0.667);
        assert_eq!(round_to(5.0, 2), 5.0);
    }
}
