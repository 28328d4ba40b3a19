//! Search history (`MyActivity.json`) parser.

use super::read_records;
use crate::error::Result;
use crate::ingest::clean::{
    clean_text, parse_coordinates, parse_timestamp, strip_prefix, WallClock,
};
use crate::ingest::{ExportParser, ParseResult, SourceFormat, SourcePattern};
use crate::table::{Column, EventColumnSet, Schema};
use crate::types::RecordType;

const TITLE_PREFIX: &str = "Searched for ";
pub(super) const MISSING_TEXT: &str = "No search text found";

/// Parser for Takeout search activity.
#[derive(Debug, Default, Clone)]
pub struct SearchHistoryParser {
    clock: WallClock,
}

impl SearchHistoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that reads UTC timestamps on `clock`.
    pub fn with_wall_clock(clock: WallClock) -> Self {
        Self { clock }
    }
}

impl ExportParser for SearchHistoryParser {
    fn record_type(&self) -> RecordType {
        RecordType::Search
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern {
                pattern: "MyActivity.json".to_string(),
                description: "Search activity export".to_string(),
            },
            SourcePattern {
                pattern: "**/Search/MyActivity.json".to_string(),
                description: "Search activity inside an unpacked Takeout archive".to_string(),
            },
        ]
    }

    fn parse_str(&self, content: &str) -> Result<ParseResult> {
        let records = read_records(content, RecordType::Search)?;
        let records_read = records.len();

        let mut texts = Vec::with_capacity(records_read);
        let mut dates = Vec::with_capacity(records_read);
        let mut latitudes = Vec::with_capacity(records_read);
        let mut longitudes = Vec::with_capacity(records_read);
        let mut warnings = Vec::new();

        for (i, record) in records.into_iter().enumerate() {
            let raw_time = record.time.as_deref().unwrap_or("");
            let Some(timestamp) = parse_timestamp(raw_time, self.clock) else {
                let warning = format!("record {}: unparseable timestamp '{}'", i, raw_time);
                tracing::warn!(record_type = "search_history", "{}", warning);
                warnings.push(warning);
                continue;
            };

            let text = clean_text(strip_prefix(&record.title, TITLE_PREFIX));
            let coordinates = record
                .location_infos
                .iter()
                .filter_map(|info| info.url.as_deref())
                .find_map(parse_coordinates);

            texts.push(if text.is_empty() {
                MISSING_TEXT.to_string()
            } else {
                text
            });
            dates.push(timestamp);
            latitudes.push(coordinates.map(|(lat, _)| lat));
            longitudes.push(coordinates.map(|(_, lng)| lng));
        }

        let events = EventColumnSet::from_columns(
            RecordType::Search,
            Schema::for_record_type(RecordType::Search),
            vec![
                Column::Text(texts),
                Column::DateTime(dates),
                Column::Float(latitudes),
                Column::Float(longitudes),
            ],
        )?;

        Ok(ParseResult {
            events,
            records_read,
            warnings,
        })
    }
}
