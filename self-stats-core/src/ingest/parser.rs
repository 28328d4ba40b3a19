//! Parser trait abstraction
//!
//! Every export format implements the [`ExportParser`] trait to provide a
//! unified interface for discovering and parsing export files.
//!
//! ## Design Principles
//!
//! 1. **Resilience**: Rows that cannot be parsed are dropped with a warning,
//!    the rest of the file still loads
//! 2. **Typed output**: Parsers emit an [`EventColumnSet`] with parsed
//!    datetimes, never raw date strings
//! 3. **Extensible**: New export formats only require implementing this trait

use crate::error::{Error, Result};
use crate::table::EventColumnSet;
use crate::types::RecordType;
use std::path::{Path, PathBuf};

/// Pattern for discovering export files of one record type.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    /// Glob pattern relative to the input directory (e.g., "MyActivity.json")
    pub pattern: String,
    /// Human-readable description for logging
    pub description: String,
}

/// Result of parsing one export file.
#[derive(Debug)]
pub struct ParseResult {
    /// Parsed events in file order
    pub events: EventColumnSet,
    /// Records read from the file, including dropped ones
    pub records_read: usize,
    /// Warnings encountered during parsing (non-fatal)
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Number of records dropped during cleaning.
    pub fn records_dropped(&self) -> usize {
        self.records_read - self.events.len()
    }
}

/// On-disk encoding of an export.
///
/// Takeout offers each activity log as either JSON or HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Json,
    Html,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub path: PathBuf,
    pub record_type: RecordType,
    pub format: SourceFormat,
}

/// Trait implemented by all export parsers.
///
/// ## Example
///
/// ```rust,ignore
/// use self_stats_core::ingest::{ExportParser, ParseResult, SourceFormat};
///
/// struct MyParser;
///
/// impl ExportParser for MyParser {
///     fn record_type(&self) -> RecordType { RecordType::Search }
///     fn source_format(&self) -> SourceFormat { SourceFormat::Json }
///     // ... implement other methods
/// }
/// ```
pub trait ExportParser: Send + Sync {
    /// Which record type this parser produces
    fn record_type(&self) -> RecordType;

    /// Which file encoding this parser reads
    fn source_format(&self) -> SourceFormat;

    /// Patterns for discovering export files, relative to the input directory.
    fn source_patterns(&self) -> Vec<SourcePattern>;

    /// Parse an export held in memory.
    ///
    /// ## Error Handling
    ///
    /// - Individual records with unusable timestamps are dropped and reported
    ///   in `ParseResult::warnings`, not returned as errors
    /// - Only a document that is not an export at all returns `Err`
    fn parse_str(&self, content: &str) -> Result<ParseResult>;

    /// Read and parse an export file.
    fn parse(&self, path: &Path) -> Result<ParseResult> {
        let content = std::fs::read_to_string(path)?;
        let result = self.parse_str(&content)?;
        tracing::info!(
            path = %path.display(),
            record_type = %self.record_type(),
            format = %self.source_format(),
            records = result.records_read,
            dropped = result.records_dropped(),
            "Parsed export file"
        );
        Ok(result)
    }

    /// Discover all export files under `dir` matching this parser's patterns.
    ///
    /// Default implementation uses glob patterns from [`Self::source_patterns`].
    fn discover_files(&self, dir: &Path) -> Result<Vec<ExportFile>> {
        let mut files: Vec<ExportFile> = Vec::new();

        for pattern in self.source_patterns() {
            let full_pattern = dir.join(&pattern.pattern);
            let pattern_str = full_pattern.to_string_lossy();

            let entries = glob::glob(&pattern_str).map_err(|e| Error::Parse {
                source_name: self.record_type().to_string(),
                message: format!("Invalid glob pattern: {}", e),
            })?;

            for path in entries.flatten() {
                if path.is_file() && !files.iter().any(|f| f.path == path) {
                    tracing::debug!(path = %path.display(), pattern = %pattern.description, "Found export");
                    files.push(ExportFile {
                        path,
                        record_type: self.record_type(),
                        format: self.source_format(),
                    });
                }
            }
        }

        Ok(files)
    }
}
