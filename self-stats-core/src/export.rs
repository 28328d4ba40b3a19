//! Table export to CSV and JSON
//!
//! Every processed export produces four files under the output directory:
//!
//! | File | Contents |
//! |------|----------|
//! | `extracted_<stem>_data` | Cleaned events as parsed |
//! | `dash_ready_<stem>_data` | Trimmed events with derived columns |
//! | `activity_windows_<stem>_data` | One row per activity window |
//! | `daily_<stem>_data` | Zero-padded per-day counts |

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::analytics::{aggregate_daily, daily_table};
use crate::config::ExportFormat;
use crate::error::Result;
use crate::pipeline::PipelineOutput;
use crate::table::{Column, Table};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Extracted,
    DashReady,
    ActivityWindows,
    Daily,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::Extracted,
        ExportKind::DashReady,
        ExportKind::ActivityWindows,
        ExportKind::Daily,
    ];

    fn prefix(&self) -> &'static str {
        match self {
            ExportKind::Extracted => "extracted",
            ExportKind::DashReady => "dash_ready",
            ExportKind::ActivityWindows => "activity_windows",
            ExportKind::Daily => "daily",
        }
    }

    /// File name for an export stem, e.g. `dash_ready_watch-history_data.csv`.
    pub fn file_name(&self, stem: &str, format: ExportFormat) -> String {
        format!("{}_{}_data.{}", self.prefix(), stem, format.extension())
    }
}

/// Write `table` in the given format.
pub fn write_table(table: &Table, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(table, path),
        ExportFormat::Json => write_json(table, path),
    }
}

/// Write `table` as CSV with a header row.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    let header: Vec<String> = table.schema().names().iter().map(|n| csv_field(n)).collect();
    writeln!(out, "{}", header.join(","))?;

    for row in 0..table.len() {
        let fields: Vec<String> = table
            .columns()
            .iter()
            .map(|column| csv_field(&cell_text(column, row)))
            .collect();
        writeln!(out, "{}", fields.join(","))?;
    }

    out.flush()?;
    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote CSV");
    Ok(())
}

/// Write `table` as a JSON array of row objects keyed by column name.
pub fn write_json(table: &Table, path: &Path) -> Result<()> {
    let rows: Vec<Value> = (0..table.len())
        .map(|row| {
            let object: Map<String, Value> = table
                .schema()
                .names()
                .iter()
                .zip(table.columns())
                .map(|(name, column)| (name.clone(), cell_json(column, row)))
                .collect();
            Value::Object(object)
        })
        .collect();

    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &rows)?;
    out.flush()?;
    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote JSON");
    Ok(())
}

/// Write all four tables for one processed export into `output_dir`.
///
/// Returns the written paths in [`ExportKind::ALL`] order.
pub fn export_all(
    output_dir: &Path,
    stem: &str,
    format: ExportFormat,
    extracted: &Table,
    output: &PipelineOutput,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let days = aggregate_daily(&output.events);
    let daily = daily_table(&days, output.record_type().flags_short_form());
    let windows = output.window_table();

    let mut written = Vec::with_capacity(ExportKind::ALL.len());
    for kind in ExportKind::ALL {
        let table = match kind {
            ExportKind::Extracted => extracted,
            ExportKind::DashReady => output.events.table(),
            ExportKind::ActivityWindows => &windows,
            ExportKind::Daily => &daily,
        };
        let path = output_dir.join(kind.file_name(stem, format));
        write_table(table, &path, format)?;
        written.push(path);
    }

    tracing::info!(
        dir = %output_dir.display(),
        stem,
        files = written.len(),
        "Exported tables"
    );
    Ok(written)
}

fn cell_text(column: &Column, row: usize) -> String {
    match column {
        Column::Text(v) => v[row].clone(),
        Column::DateTime(v) => v[row].format(DATETIME_FORMAT).to_string(),
        Column::Date(v) => v[row].format(DATE_FORMAT).to_string(),
        Column::Int(v) => v[row].to_string(),
        Column::Float(v) => v[row].map(|f| format!("{:?}", f)).unwrap_or_default(),
        Column::Bool(v) => v[row].to_string(),
    }
}

fn cell_json(column: &Column, row: usize) -> Value {
    match column {
        Column::Text(v) => Value::from(v[row].as_str()),
        Column::DateTime(v) => Value::from(v[row].format(DATETIME_FORMAT).to_string()),
        Column::Date(v) => Value::from(v[row].format(DATE_FORMAT).to_string()),
        Column::Int(v) => Value::from(v[row]),
        // Non-finite floats have no JSON form and become null
        Column::Float(v) => v[row].map(Value::from).unwrap_or(Value::Null),
        Column::Bool(v) => Value::from(v[row]),
    }
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_table() -> Table {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Table::new(
            Schema::new(["Text Title", "Date", "Latitude", "Short"]),
            vec![
                Column::Text(vec!["plain".to_string(), "a, \"quoted\" one".to_string()]),
                Column::DateTime(vec![
                    day.and_hms_opt(10, 0, 0).unwrap(),
                    day.and_hms_opt(10, 5, 30).unwrap(),
                ]),
                Column::Float(vec![Some(47.5), None]),
                Column::Bool(vec![true, false]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_table(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Text Title,Date,Latitude,Short");
        assert_eq!(lines[1], "plain,2024-01-01 10:00:00,47.5,true");
        assert_eq!(
            lines[2],
            "\"a, \"\"quoted\"\" one\",2024-01-01 10:05:30,,false"
        );
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_json(&sample_table(), &path).unwrap();

        let rows: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], "2024-01-01 10:00:00");
        assert_eq!(rows[0]["Latitude"], 47.5);
        assert_eq!(rows[1]["Latitude"], Value::Null);
        assert_eq!(rows[1]["Short"], false);

        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Text Title", "Date", "Latitude", "Short"]);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            ExportKind::DashReady.file_name("watch-history", ExportFormat::Csv),
            "dash_ready_watch-history_data.csv"
        );
        assert_eq!(
            ExportKind::ActivityWindows.file_name("MyActivity", ExportFormat::Json),
            "activity_windows_MyActivity_data.json"
        );
    }
}
