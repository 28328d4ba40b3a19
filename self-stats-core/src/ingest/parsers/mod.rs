//! Export-specific parsers
//!
//! Each supported export has a parser module that implements
//! the [`ExportParser`](super::ExportParser) trait.
//!
//! | Export | File | Module |
//! |--------|------|--------|
//! | Search history | `MyActivity.json` | [`search`] |
//! | Watch history | `watch-history.json` | [`watch`] |
//! | Search history | `MyActivity.html` | [`search_html`] |
//! | Watch history | `watch-history.html` | [`watch_html`] |

mod html;
mod search;
mod search_html;
mod watch;
mod watch_html;

pub use search::SearchHistoryParser;
pub use search_html::SearchHistoryHtmlParser;
pub use watch::WatchHistoryParser;
pub use watch_html::WatchHistoryHtmlParser;

use super::{ExportParser, SourceFormat, WallClock};
use crate::error::{Error, Result};
use crate::types::RecordType;
use serde::Deserialize;

/// Create all available parsers.
///
/// JSON timestamps are converted to `clock`; HTML dates are already local.
pub fn create_all_parsers(clock: WallClock) -> Vec<Box<dyn ExportParser>> {
    vec![
        Box::new(SearchHistoryParser::with_wall_clock(clock)),
        Box::new(WatchHistoryParser::with_wall_clock(clock)),
        Box::new(SearchHistoryHtmlParser::new()),
        Box::new(WatchHistoryHtmlParser::new()),
    ]
}

/// Get the parser for a record type and file encoding.
pub fn parser_for(
    record_type: RecordType,
    format: SourceFormat,
    clock: WallClock,
) -> Box<dyn ExportParser> {
    match (record_type, format) {
        (RecordType::Search, SourceFormat::Json) => {
            Box::new(SearchHistoryParser::with_wall_clock(clock))
        }
        (RecordType::Watch, SourceFormat::Json) => {
            Box::new(WatchHistoryParser::with_wall_clock(clock))
        }
        (RecordType::Search, SourceFormat::Html) => Box::new(SearchHistoryHtmlParser::new()),
        (RecordType::Watch, SourceFormat::Html) => Box::new(WatchHistoryHtmlParser::new()),
    }
}

/// One activity entry as it appears in a Takeout JSON export.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TakeoutRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_url: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub subtitles: Vec<TakeoutLink>,
    #[serde(default)]
    pub location_infos: Vec<TakeoutLink>,
}

/// Named link attached to a record (channel, location).
#[derive(Debug, Deserialize, Default)]
pub(crate) struct TakeoutLink {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Deserialize the top-level record array.
pub(crate) fn read_records(content: &str, record_type: RecordType) -> Result<Vec<TakeoutRecord>> {
    serde_json::from_str(content).map_err(|e| Error::Parse {
        source_name: record_type.to_string(),
        message: format!("expected a JSON array of activity records: {}", e),
    })
}
