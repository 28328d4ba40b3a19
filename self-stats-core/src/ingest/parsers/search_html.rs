//! Search history (`MyActivity.html`) parser.

use super::html::{self, DateLine};
use super::search::MISSING_TEXT;
use crate::error::Result;
use crate::ingest::clean::{clean_text, parse_coordinates, parse_display_timestamp};
use crate::ingest::{ExportParser, ParseResult, SourceFormat, SourcePattern};
use crate::table::{Column, EventColumnSet, Schema};
use crate::types::RecordType;
use scraper::Html;

/// Parser for the HTML rendering of Takeout search activity.
///
/// The query is the text of the first link in each entry; anything before
/// it (`Searched for`, `Visited`) is not part of the title.
#[derive(Debug, Default, Clone)]
pub struct SearchHistoryHtmlParser;

impl SearchHistoryHtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl ExportParser for SearchHistoryHtmlParser {
    fn record_type(&self) -> RecordType {
        RecordType::Search
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::Html
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern {
                pattern: "MyActivity.html".to_string(),
                description: "Search activity export (HTML)".to_string(),
            },
            SourcePattern {
                pattern: "**/Search/MyActivity.html".to_string(),
                description: "Search activity inside an unpacked Takeout archive (HTML)"
                    .to_string(),
            },
        ]
    }

    fn parse_str(&self, content: &str) -> Result<ParseResult> {
        let document = Html::parse_document(content);
        let entries = html::entries(&document);
        let records_read = entries.len();

        let mut texts = Vec::with_capacity(records_read);
        let mut dates = Vec::with_capacity(records_read);
        let mut latitudes = Vec::with_capacity(records_read);
        let mut longitudes = Vec::with_capacity(records_read);
        let mut warnings = Vec::new();

        for (i, entry) in entries.into_iter().enumerate() {
            let raw_date = html::date_text(entry, DateLine::AfterFirstBreak).unwrap_or_default();
            let Some(timestamp) = parse_display_timestamp(&raw_date) else {
                let warning = format!("entry {}: unparseable date '{}'", i, raw_date);
                tracing::warn!(record_type = "search_history", "{}", warning);
                warnings.push(warning);
                continue;
            };

            let text = html::links(entry)
                .into_iter()
                .next()
                .map(|(_, text)| clean_text(&text))
                .filter(|text| !text.is_empty());
            let coordinates = html::location_url(entry).and_then(|url| parse_coordinates(&url));

            texts.push(text.unwrap_or_else(|| MISSING_TEXT.to_string()));
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
