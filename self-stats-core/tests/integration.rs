//! Integration tests for the ingest, pipeline and export flow
//!
//! These tests use fixture files in `tests/fixtures/takeout/` (JSON) and
//! `tests/fixtures/takeout_html/` (the same activity as HTML) to verify the
//! end-to-end path from Takeout exports to exported tables.

use self_stats_core::analytics::{aggregate_daily, summarize};
use self_stats_core::config::{ExportFormat, PipelineConfig};
use self_stats_core::export::export_all;
use self_stats_core::ingest::parsers::{
    SearchHistoryHtmlParser, SearchHistoryParser, WatchHistoryHtmlParser, WatchHistoryParser,
};
use self_stats_core::ingest::{ExportParser, IngestCoordinator, SourceFormat, WallClock};
use self_stats_core::types::{
    RecordType, GAP_COLUMN, LATITUDE_COLUMN, SHORT_FORM_COLUMN, TEXT_TITLE_COLUMN, WEEKDAY_COLUMN,
};
use self_stats_core::{Column, Config, Pipeline};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/takeout")
        .join(name)
}

fn html_fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/takeout_html")
        .join(name)
}

/// JSON parsers reading timestamps as UTC, so fixture hours are stable.
fn watch_parser() -> WatchHistoryParser {
    WatchHistoryParser::with_wall_clock(WallClock::utc())
}

fn search_parser() -> SearchHistoryParser {
    SearchHistoryParser::with_wall_clock(WallClock::utc())
}

// ============================================
// Parsing Tests
// ============================================

#[test]
fn test_parse_watch_fixture() {
    let result = watch_parser()
        .parse(&fixture_path("watch-history.json"))
        .expect("parse should succeed");

    assert_eq!(result.records_read, 9);
    assert_eq!(result.events.len(), 8);
    assert_eq!(result.records_dropped(), 1);
    assert_eq!(result.events.record_type(), RecordType::Watch);
}

#[test]
fn test_parse_search_fixture() {
    let result = search_parser()
        .parse(&fixture_path("MyActivity.json"))
        .expect("parse should succeed");

    assert_eq!(result.events.len(), 4);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_parse_watch_html_fixture() {
    let result = WatchHistoryHtmlParser::new()
        .parse(&html_fixture_path("watch-history.html"))
        .expect("parse should succeed");

    assert_eq!(result.records_read, 9);
    assert_eq!(result.events.len(), 8);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.events.timestamps()[0].to_string(),
        "2024-05-02 09:01:00"
    );
}

#[test]
fn test_parse_search_html_fixture() {
    let result = SearchHistoryHtmlParser::new()
        .parse(&html_fixture_path("MyActivity.html"))
        .expect("parse should succeed");

    assert_eq!(result.events.len(), 4);
    assert_eq!(
        result.events.column(TEXT_TITLE_COLUMN),
        Some(&Column::Text(vec![
            "weather tomorrow".to_string(),
            "The Rust Programming Language".to_string(),
            "rust, \"borrow\" checker".to_string(),
            "rust book".to_string(),
        ]))
    );
    assert_eq!(
        result.events.column(LATITUDE_COLUMN),
        Some(&Column::Float(vec![None, None, Some(47.606209), None]))
    );
}

#[test]
fn test_coordinator_loads_both_exports() {
    let loaded = IngestCoordinator::new()
        .load_all(&fixture_path(""))
        .expect("load should succeed");

    assert_eq!(loaded.exports.len(), 2);
    assert!(loaded.errors.is_empty());
    assert_eq!(loaded.total_events(), 12);
    assert_eq!(loaded.total_dropped(), 1);
}

#[test]
fn test_coordinator_loads_html_exports() {
    let loaded = IngestCoordinator::new()
        .load_all(&html_fixture_path(""))
        .expect("load should succeed");

    assert_eq!(loaded.exports.len(), 2);
    assert!(loaded.errors.is_empty());
    assert!(loaded
        .exports
        .iter()
        .all(|e| e.file.format == SourceFormat::Html));
    assert_eq!(loaded.total_events(), 12);
    assert_eq!(loaded.total_dropped(), 1);
}

// ============================================
// Pipeline Tests
// ============================================

#[test]
fn test_watch_pipeline_end_to_end() {
    self_stats_core::logging::init_test();

    let parsed = watch_parser()
        .parse(&fixture_path("watch-history.json"))
        .unwrap();
    let output = Pipeline::from_config(&Config::default())
        .process(parsed.events)
        .expect("pipeline should succeed");

    // Two active days cannot be split, so nothing is trimmed
    assert_eq!(output.rows_trimmed, 0);
    assert_eq!(output.events.len(), 8);

    assert_eq!(
        output.gaps,
        vec![
            None,
            Some(0.75),
            Some(8.0),
            Some(1.25),
            None,
            Some(5.0),
            None,
            Some(1.0)
        ]
    );

    let bounds: Vec<(usize, usize)> = output
        .windows
        .iter()
        .map(|w| (w.start_index, w.end_index))
        .collect();
    assert_eq!(bounds, vec![(0, 3), (4, 5), (6, 7)]);

    let first = &output.windows[0];
    assert_eq!(first.duration_minutes, 10.0);
    assert_eq!(first.event_count, 4);
    assert_eq!(first.rate_per_10min, Some(4.0));
    assert_eq!(output.windows[1].rate_per_10min, None);

    assert_eq!(
        output.events.column(SHORT_FORM_COLUMN),
        Some(&Column::Bool(vec![
            false, true, false, true, false, false, false, true
        ]))
    );
    assert!(output.events.schema().contains(GAP_COLUMN));
    assert!(output.events.schema().contains(WEEKDAY_COLUMN));

    let days = aggregate_daily(&output.events);
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].count, 6);
    assert_eq!(days[0].short_form_ratio, Some(1.0));
    assert_eq!(days[1].short_form_ratio, None);
}

#[test]
fn test_search_pipeline_summary() {
    let parsed = search_parser()
        .parse(&fixture_path("MyActivity.json"))
        .unwrap();
    let output = Pipeline::from_config(&Config::default())
        .process(parsed.events)
        .unwrap();

    assert!(!output.events.schema().contains(SHORT_FORM_COLUMN));
    assert_eq!(output.windows.len(), 1);
    assert_eq!(output.windows[0].rate_per_10min, Some(3.0));

    let summary = summarize(&output);
    assert_eq!(summary.totals.events, 4);
    assert_eq!(summary.time_patterns.peak_hour, 18);
    assert_eq!(summary.streaks.longest_streak_days, 2);
}

#[test]
fn test_html_and_json_exports_segment_alike() {
    let config = Config::default();
    let pipeline = Pipeline::from_config(&config);

    let json = watch_parser()
        .parse(&fixture_path("watch-history.json"))
        .unwrap();
    let html = WatchHistoryHtmlParser::new()
        .parse(&html_fixture_path("watch-history.html"))
        .unwrap();

    let json = pipeline.process(json.events).unwrap();
    let html = pipeline.process(html.events).unwrap();

    assert_eq!(json.gaps, html.gaps);
    assert_eq!(json.windows, html.windows);
    assert_eq!(
        json.events.column(SHORT_FORM_COLUMN),
        html.events.column(SHORT_FORM_COLUMN)
    );
}

#[test]
fn test_wall_clock_moves_daily_buckets() {
    // At UTC+05:00 every fixture event falls on 2024-05-02
    let parsed = WatchHistoryParser::with_wall_clock("+05:00".parse().unwrap())
        .parse(&fixture_path("watch-history.json"))
        .unwrap();
    let output = Pipeline::from_config(&Config::default())
        .process(parsed.events)
        .unwrap();

    assert_eq!(output.events.timestamps()[0].to_string(), "2024-05-02 01:00:00");
    assert_eq!(output.windows.len(), 3);

    let days = aggregate_daily(&output.events);
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].count, 8);
}

#[test]
fn test_wider_interrupt_merges_windows() {
    let parsed = watch_parser()
        .parse(&fixture_path("watch-history.json"))
        .unwrap();
    let pipeline = Pipeline::new(
        PipelineConfig {
            interrupt_minutes: 60,
            ..Default::default()
        },
        Default::default(),
    );
    let output = pipeline.process(parsed.events).unwrap();

    let bounds: Vec<(usize, usize)> = output
        .windows
        .iter()
        .map(|w| (w.start_index, w.end_index))
        .collect();
    assert_eq!(bounds, vec![(0, 5), (6, 7)]);
    assert_eq!(output.windows[0].duration_minutes, 65.0);
}

// ============================================
// Export Tests
// ============================================

#[test]
fn test_export_all_csv() {
    let parsed = watch_parser()
        .parse(&fixture_path("watch-history.json"))
        .unwrap();
    let extracted = parsed.events.table().clone();
    let output = Pipeline::from_config(&Config::default())
        .process(parsed.events)
        .unwrap();

    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("output");
    let written = export_all(
        &out_dir,
        "watch-history",
        ExportFormat::Csv,
        &extracted,
        &output,
    )
    .expect("export should succeed");

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "extracted_watch-history_data.csv",
            "dash_ready_watch-history_data.csv",
            "activity_windows_watch-history_data.csv",
            "daily_watch-history_data.csv",
        ]
    );

    let windows = fs::read_to_string(out_dir.join("activity_windows_watch-history_data.csv")).unwrap();
    let lines: Vec<&str> = windows.lines().collect();
    assert_eq!(
        lines[0],
        "Activity_Window_Start_Date,Activity_Window_Start_Index,Activity_Window_End_Index,\
         Activity_Window_Duration,Actions_per_Activity_Window,Approximate_Actions_per_Minute"
    );
    assert_eq!(lines[1], "2024-05-01 20:00:00,0,3,10.0,4,4.0");
    assert_eq!(lines[2], "2024-05-01 21:00:00,4,5,5.0,2,");
    assert_eq!(lines.len(), 4);

    let daily = fs::read_to_string(out_dir.join("daily_watch-history_data.csv")).unwrap();
    assert!(daily.starts_with("Date,Count,Short-Form Ratio\n2024-05-01,6,1.0\n"));

    // Extracted rows stay in file order
    let extracted = fs::read_to_string(out_dir.join("extracted_watch-history_data.csv")).unwrap();
    assert!(extracted
        .lines()
        .nth(1)
        .unwrap()
        .ends_with("Daily Moves,2024-05-02 09:01:00"));
}

#[test]
fn test_export_all_json() {
    let parsed = search_parser()
        .parse(&fixture_path("MyActivity.json"))
        .unwrap();
    let extracted = parsed.events.table().clone();
    let output = Pipeline::from_config(&Config::default())
        .process(parsed.events)
        .unwrap();

    let temp = TempDir::new().unwrap();
    export_all(temp.path(), "MyActivity", ExportFormat::Json, &extracted, &output).unwrap();

    let content = fs::read_to_string(temp.path().join("dash_ready_MyActivity_data.json")).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["Text Title"], "rust book");
    assert_eq!(rows[1]["Text Title"], "rust, \"borrow\" checker");
    assert_eq!(rows[1]["Latitude"], 47.606209);
    assert_eq!(rows[0][GAP_COLUMN], serde_json::Value::Null);
    assert_eq!(rows[1][GAP_COLUMN], 3.0);
}
