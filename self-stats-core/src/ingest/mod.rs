//! Ingestion layer for Takeout activity exports
//!
//! This module turns raw export files into typed [`EventColumnSet`]s that
//! the processing pipeline consumes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Export Files   │ ──► │ IngestCoordinator│ ──► │ EventColumnSet  │
//! │ (personal_data) │     │                  │     │  (per file)     │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!                               │
//!                               ▼
//!                    ┌────────────────────────────┐
//!                    │  ExportParser              │
//!                    │  ├─ SearchHistoryParser    │
//!                    │  ├─ WatchHistoryParser     │
//!                    │  ├─ SearchHistoryHtmlParser│
//!                    │  └─ WatchHistoryHtmlParser │
//!                    └────────────────────────────┘
//!
//! JSON exports are stamped in UTC and are converted to a [`WallClock`]
//! (the system zone unless configured). HTML exports already show local
//! time.
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use self_stats_core::ingest::IngestCoordinator;
//!
//! let coordinator = IngestCoordinator::new();
//! let loaded = coordinator.load_all(Path::new("personal_data"))?;
//! for export in &loaded.exports {
//!     println!("{}: {} events", export.file.path.display(), export.result.events.len());
//! }
//! ```

mod clean;
mod parser;
pub mod parsers;

pub use clean::{
    clean_text, parse_coordinates, parse_display_timestamp, parse_timestamp, WallClock,
};
pub use parser::{ExportFile, ExportParser, ParseResult, SourceFormat, SourcePattern};

use crate::error::{Error, Result};
use crate::table::EventColumnSet;
use std::path::{Path, PathBuf};

/// One successfully parsed export file.
#[derive(Debug)]
pub struct LoadedExport {
    pub file: ExportFile,
    pub result: ParseResult,
}

impl LoadedExport {
    /// File stem used to name output files (e.g. `watch-history`).
    pub fn stem(&self) -> String {
        self.file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.record_type.as_str().to_string())
    }

    pub fn events(&self) -> &EventColumnSet {
        &self.result.events
    }
}

/// Result of loading every export under a directory.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Parsed exports in discovery order
    pub exports: Vec<LoadedExport>,
    /// Files that could not be parsed (file path → error message)
    pub errors: Vec<(PathBuf, String)>,
}

impl LoadResult {
    /// Total events across all loaded exports.
    pub fn total_events(&self) -> usize {
        self.exports.iter().map(|e| e.result.events.len()).sum()
    }

    /// Total records dropped during cleaning.
    pub fn total_dropped(&self) -> usize {
        self.exports.iter().map(|e| e.result.records_dropped()).sum()
    }
}

/// Coordinates discovery and parsing across all registered parsers.
pub struct IngestCoordinator {
    parsers: Vec<Box<dyn ExportParser>>,
}

impl Default for IngestCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestCoordinator {
    /// Create a new coordinator with the default parsers.
    pub fn new() -> Self {
        Self::with_wall_clock(WallClock::default())
    }

    /// Default parsers, with JSON timestamps shown on `clock`.
    pub fn with_wall_clock(clock: WallClock) -> Self {
        Self {
            parsers: parsers::create_all_parsers(clock),
        }
    }

    /// Create a coordinator with custom parsers.
    pub fn with_parsers(parsers: Vec<Box<dyn ExportParser>>) -> Self {
        Self { parsers }
    }

    /// Register an additional parser.
    pub fn register_parser(&mut self, parser: Box<dyn ExportParser>) {
        self.parsers.push(parser);
    }

    /// Discover export files for all registered parsers under `dir`.
    ///
    /// Returns an error if `dir` does not exist or is not a directory.
    pub fn discover_files(&self, dir: &Path) -> Result<Vec<ExportFile>> {
        ensure_dir(dir)?;
        let mut all_files = Vec::new();

        for parser in &self.parsers {
            match parser.discover_files(dir) {
                Ok(files) => {
                    tracing::info!(
                        record_type = %parser.record_type(),
                        format = %parser.source_format(),
                        count = files.len(),
                        "Discovered export files"
                    );
                    all_files.extend(files);
                }
                Err(e) => {
                    tracing::warn!(
                        record_type = %parser.record_type(),
                        error = %e,
                        "Failed to discover files"
                    );
                }
            }
        }

        Ok(all_files)
    }

    /// Parse a single discovered file with the matching parser.
    pub fn load_file(&self, file: &ExportFile) -> Result<ParseResult> {
        let parser = self
            .parsers
            .iter()
            .find(|p| {
                p.record_type() == file.record_type && p.source_format() == file.format
            })
            .ok_or_else(|| Error::Parse {
                source_name: file.record_type.to_string(),
                message: format!("no {} parser registered", file.format),
            })?;
        parser.parse(&file.path)
    }

    /// Discover and parse every export under `dir`.
    ///
    /// A file that fails to parse is recorded in [`LoadResult::errors`] and
    /// does not stop the others from loading.
    pub fn load_all(&self, dir: &Path) -> Result<LoadResult> {
        let files = self.discover_files(dir)?;
        let mut result = LoadResult::default();

        for file in files {
            match self.load_file(&file) {
                Ok(parsed) => result.exports.push(LoadedExport { file, result: parsed }),
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Failed to parse export");
                    result.errors.push((file.path, e.to_string()));
                }
            }
        }

        Ok(result)
    }
}

/// Discover export files under `dir` with the default parsers.
pub fn discover_exports(dir: &Path) -> Result<Vec<ExportFile>> {
    IngestCoordinator::new().discover_files(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory not found: {}", dir.display()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordType;
    use std::fs;
    use tempfile::TempDir;

    const WATCH: &str = r#"[{"title": "Watched A", "titleUrl": "https://www.youtube.com/watch?v=a", "time": "2024-05-01T20:15:00Z"}]"#;
    const SEARCH: &str = r#"[{"title": "Searched for b", "time": "2024-05-01T20:15:00Z"}]"#;

    #[test]
    fn test_discover_flat_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("watch-history.json"), WATCH).unwrap();
        fs::write(dir.path().join("MyActivity.json"), SEARCH).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = discover_exports(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.record_type == RecordType::Search));
        assert!(files.iter().any(|f| f.record_type == RecordType::Watch));
    }

    #[test]
    fn test_discover_takeout_layout() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("Takeout/YouTube and YouTube Music/history");
        fs::create_dir_all(&history).unwrap();
        fs::write(history.join("watch-history.json"), WATCH).unwrap();

        let files = discover_exports(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].record_type, RecordType::Watch);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let result = discover_exports(&dir.path().join("absent"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    const WATCH_HTML: &str = r#"<html><body><div class="mdl-grid">
<div class="outer-cell mdl-cell mdl-cell--12-col mdl-shadow--2dp"><div class="mdl-grid">
<div class="content-cell mdl-cell mdl-cell--6-col mdl-typography--body-1">Watched&nbsp;<a href="https://www.youtube.com/watch?v=a">A</a><br><a href="https://www.youtube.com/channel/c">C</a><br>May 1, 2024, 8:15:00 PM EDT</div>
</div></div></div></body></html>"#;
    const SEARCH_HTML: &str = r#"<html><body>
<div class="content-cell mdl-cell mdl-cell--6-col mdl-typography--body-1">Searched for&nbsp;<a href="https://www.google.com/search?q=b">b</a><br>May 1, 2024, 8:20:00 PM EDT</div>
</body></html>"#;

    #[test]
    fn test_discover_html_only_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("watch-history.html"), WATCH_HTML).unwrap();
        fs::write(dir.path().join("MyActivity.html"), SEARCH_HTML).unwrap();

        let files = discover_exports(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.format == SourceFormat::Html));

        let loaded = IngestCoordinator::new().load_all(dir.path()).unwrap();
        assert!(loaded.errors.is_empty());
        assert_eq!(loaded.total_events(), 2);

        let watch = loaded
            .exports
            .iter()
            .find(|e| e.file.record_type == RecordType::Watch)
            .unwrap();
        assert_eq!(watch.stem(), "watch-history");
        assert_eq!(
            watch.events().timestamps()[0].to_string(),
            "2024-05-01 20:15:00"
        );
    }

    #[test]
    fn test_load_file_uses_matching_format() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("watch-history.json"), WATCH).unwrap();
        fs::write(dir.path().join("watch-history.html"), WATCH_HTML).unwrap();

        let loaded = IngestCoordinator::with_wall_clock(WallClock::utc())
            .load_all(dir.path())
            .unwrap();
        assert_eq!(loaded.exports.len(), 2);
        assert!(loaded.errors.is_empty());
        for export in &loaded.exports {
            assert_eq!(export.result.records_read, 1);
            assert_eq!(export.events().len(), 1);
        }
    }

    #[test]
    fn test_load_all_collects_parse_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("watch-history.json"), WATCH).unwrap();
        fs::write(dir.path().join("MyActivity.json"), "not json").unwrap();

        let loaded = IngestCoordinator::new().load_all(dir.path()).unwrap();
        assert_eq!(loaded.exports.len(), 1);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.total_events(), 1);
        assert_eq!(loaded.exports[0].stem(), "watch-history");
    }
}
