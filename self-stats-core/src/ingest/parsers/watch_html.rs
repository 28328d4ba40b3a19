//! Watch history (`watch-history.html`) parser.

use super::html::{self, DateLine};
use super::watch::{MISSING_CHANNEL, MISSING_TITLE, MISSING_URL};
use crate::error::Result;
use crate::ingest::clean::{clean_text, parse_display_timestamp};
use crate::ingest::{ExportParser, ParseResult, SourceFormat, SourcePattern};
use crate::table::{Column, EventColumnSet, Schema};
use crate::types::RecordType;
use scraper::Html;

/// Parser for the HTML rendering of Takeout watch history.
///
/// Entry layout: video link, channel link, then the date after the last
/// `<br>`. The first link only counts as a video URL when it points at a
/// `watch` page; ads and posts keep their text but get the URL placeholder.
#[derive(Debug, Default, Clone)]
pub struct WatchHistoryHtmlParser;

impl WatchHistoryHtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl ExportParser for WatchHistoryHtmlParser {
    fn record_type(&self) -> RecordType {
        RecordType::Watch
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::Html
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern {
                pattern: "watch-history.html".to_string(),
                description: "Watch history export (HTML)".to_string(),
            },
            SourcePattern {
                pattern: "**/history/watch-history.html".to_string(),
                description: "Watch history inside an unpacked Takeout archive (HTML)".to_string(),
            },
        ]
    }

    fn parse_str(&self, content: &str) -> Result<ParseResult> {
        let document = Html::parse_document(content);
        let entries = html::entries(&document);
        let records_read = entries.len();

        let mut urls = Vec::with_capacity(records_read);
        let mut titles = Vec::with_capacity(records_read);
        let mut channels = Vec::with_capacity(records_read);
        let mut dates = Vec::with_capacity(records_read);
        let mut warnings = Vec::new();

        for (i, entry) in entries.into_iter().enumerate() {
            let raw_date = html::date_text(entry, DateLine::AfterLastBreak).unwrap_or_default();
            let Some(timestamp) = parse_display_timestamp(&raw_date) else {
                let warning = format!("entry {}: unparseable date '{}'", i, raw_date);
                tracing::warn!(record_type = "watch_history", "{}", warning);
                warnings.push(warning);
                continue;
            };

            let links = html::links(entry);
            let video = links.first();
            let url = video
                .map(|(href, _)| href.trim())
                .filter(|href| href.contains("watch"))
                .map(str::to_string);
            let title = video
                .map(|(_, text)| clean_text(text))
                .filter(|text| !text.is_empty());
            let channel = links
                .get(1)
                .map(|(_, text)| clean_text(text))
                .filter(|text| !text.is_empty());

            urls.push(url.unwrap_or_else(|| MISSING_URL.to_string()));
            titles.push(title.unwrap_or_else(|| MISSING_TITLE.to_string()));
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

    fn cell(body: &str) -> String {
        format!(
            r#"<div class="outer-cell mdl-cell mdl-cell--12-col mdl-shadow--2dp"><div class="mdl-grid">
<div class="content-cell mdl-cell mdl-cell--6-col mdl-typography--body-1">{body}</div>
<div class="content-cell mdl-cell mdl-cell--6-col mdl-typography--body-1 mdl-typography--text-right"></div>
</div></div>"#
        )
    }

    #[test]
    fn test_parse_watch_html() {
        let content = [
            cell(r#"Watched&nbsp;<a href="https://www.youtube.com/watch?v=abc123">How the borrow checker works</a><br><a href="https://www.youtube.com/channel/xyz">Rust Talks</a><br>May 1, 2024, 8:15:00 PM EDT"#),
            cell("Watched a video that has been removed<br>May 1, 2024, 8:16:30 PM EDT"),
            cell(r#"Viewed&nbsp;<a href="https://www.youtube.com/post/p1">Community post</a><br>May 1, 2024, 8:20:00 PM EDT"#),
            cell(r#"Watched&nbsp;<a href="https://www.youtube.com/watch?v=z">No date</a><br>"#),
        ]
        .concat();

        let result = WatchHistoryHtmlParser::new().parse_str(&content).unwrap();

        assert_eq!(result.records_read, 4);
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.records_dropped(), 1);

        assert_eq!(
            result.events.column(VIDEO_URL_COLUMN),
            Some(&Column::Text(vec![
                "https://www.youtube.com/watch?v=abc123".to_string(),
                MISSING_URL.to_string(),
                MISSING_URL.to_string(),
            ]))
        );
        assert_eq!(
            result.events.column(VIDEO_TITLE_COLUMN),
            Some(&Column::Text(vec![
                "How the borrow checker works".to_string(),
                MISSING_TITLE.to_string(),
                "Community post".to_string(),
            ]))
        );
        assert_eq!(
            result.events.column(CHANNEL_TITLE_COLUMN),
            Some(&Column::Text(vec![
                "Rust Talks".to_string(),
                MISSING_CHANNEL.to_string(),
                MISSING_CHANNEL.to_string(),
            ]))
        );
        assert_eq!(
            result.events.timestamps()[1].to_string(),
            "2024-05-01 20:16:30"
        );
    }
}
