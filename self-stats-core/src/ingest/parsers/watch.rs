//! Watch history (`watch-history.json`) parser.

use super::read_records;
use crate::error::Result;
use crate::ingest::clean::{clean_text, parse_timestamp, strip_prefix, WallClock};
use crate::ingest::{ExportParser, ParseResult, SourceFormat, SourcePattern};
use crate::table::{Column, EventColumnSet, Schema};
use crate::types::RecordType;

const TITLE_PREFIX: &str = "Watched ";
pub(super) const MISSING_URL: &str = "No URL found";
pub(super) const MISSING_TITLE: &str = "No video title found";
pub(super) const MISSING_CHANNEL: &str = "No channel title found";

/// Parser for Takeout video watch history.
#[derive(Debug, Default, Clone)]
pub struct WatchHistoryParser {
    clock: WallClock,
}

impl WatchHistoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that reads UTC timestamps on `clock`.
    pub fn with_wall_clock(clock: WallClock) -> Self {
        Self { clock }
    }
}

impl ExportParser for WatchHistoryParser {
    fn record_type(&self) -> RecordType {
        RecordType::Watch
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern {
                pattern: "watch-history.json".to_string(),
                description: "Watch history export".to_string(),
            },
            SourcePattern {
                pattern: "**/history/watch-history.json".to_string(),
                description: "Watch history inside an unpacked Takeout archive".to_string(),
            },
        ]
    }

    fn parse_str(&self, content: &str) -> Result<ParseResult> {
        let records = read_records(content, RecordType::Watch)?;
        let records_read = records.len();

        let mut urls = Vec::with_capacity(records_read);
        let mut titles = Vec::with_capacity(records_read);
        let mut channels = Vec::with_capacity(records_read);
        let mut dates = Vec::with_capacity(records_read);
        let mut warnings = Vec::new();

        for (i, record) in records.into_iter().enumerate() {
            let raw_time = record.time.as_deref().unwrap_or("");
            let Some(timestamp) = parse_timestamp(raw_time, self.clock) else {
                let warning = format!("record {}: unparseable timestamp '{}'", i, raw_time);
                tracing::warn!(record_type = "watch_history", "{}", warning);
                warnings.push(warning);
                continue;
            };

            let title = clean_text(strip_prefix(&record.title, TITLE_PREFIX));
            let channel = record
                .subtitles
                .first()
                .and_then(|s| s.name.as_deref())
                .map(clean_text)
                .filter(|name| !name.is_empty());

            urls.push(
                record
                    .title_url
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| MISSING_URL.to_string()),
            );
            titles.push(if title.is_empty() {
                MISSING_TITLE.to_string()
            } else {
                title
            });
            channels.push(channel.unwrap_or_else(|| MISSING_CHANNEL.to_string()));
            dates.push(timestamp);
        }

        let events = EventColumnSet::from_columns(
            RecordType::Watch,
            Schema::for_record_type(RecordType::Watch),
            vec![
                Column::Text(urls),
                Column::Text(titles),
                Column::Text(channels),
                Column::DateTime(dates),
            ],
        )?;

        Ok(ParseResult {
            events,
            records_read,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CHANNEL_TITLE_COLUMN, VIDEO_TITLE_COLUMN, VIDEO_URL_COLUMN};

    const EXPORT: &str = r#"[
      {
        "header": "YouTube",
        "title": "Watched How the borrow checker works",
        "titleUrl": "https://www.youtube.com/watch?v=abc123",
        "subtitles": [{"name": "Rust Talks", "url": "https://www.youtube.com/channel/xyz"}],
        "time": "2024-05-01T20:15:00.000Z",
        "products": ["YouTube"]
      },
      {
        "header": "YouTube",
        "title": "Watched a video that has been removed",
        "time": "2024-05-01T20:16:30Z"
      },
      {
        "header": "YouTube",
        "title": "Watched Missing time"
      }
    ]"#;

    #[test]
    fn test_parse_watch_export() {
        let result = WatchHistoryParser::with_wall_clock(WallClock::utc())
            .parse_str(EXPORT)
            .unwrap();

        assert_eq!(result.records_read, 3);
        assert_eq!(result.events.len(), 2);
        assert_eq!(result.warnings.len(), 1);

        assert_eq!(
            result.events.column(VIDEO_URL_COLUMN),
            Some(&Column::Text(vec![
                "https://www.youtube.com/watch?v=abc123".to_string(),
                MISSING_URL.to_string(),
            ]))
        );
        assert_eq!(
            result.events.column(VIDEO_TITLE_COLUMN),
            Some(&Column::Text(vec![
                "How the borrow checker works".to_string(),
                "a video that has been removed".to_string(),
            ]))
        );
        assert_eq!(
            result.events.column(CHANNEL_TITLE_COLUMN),
            Some(&Column::Text(vec![
                "Rust Talks".to_string(),
                MISSING_CHANNEL.to_string(),
            ]))
        );
    }

    #[test]
    fn test_first_column_is_discriminator() {
        let result = WatchHistoryParser::new().parse_str("[]").unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.events.schema().names()[0], VIDEO_URL_COLUMN);
    }
}
