//! Pipeline orchestration
//!
//! Sequences the segmentation stages for one record type:
//!
//! ```text
//! sort -> trim leading noise -> derive Weekday/Hour/Date Only
//!      -> gaps + windows -> window stats -> attach gap (+ short-form) columns
//! ```
//!
//! Each stage returns a new [`EventColumnSet`] whose schema includes the
//! columns it added, so there is no shared column list to keep in sync.

use crate::config::{ChangepointConfig, Config, PipelineConfig};
use crate::error::Result;
use crate::segmentation::{
    compute_window_stats, compute_windows, trim_leading_noise, ChangepointDetector,
};
use crate::table::{Column, EventColumnSet, Schema, Table};
use crate::types::{
    ActivityWindow, RecordType, DATE_ONLY_COLUMN, GAP_COLUMN, HOUR_COLUMN, SHORT_FORM_COLUMN,
    WEEKDAY_COLUMN, WINDOW_ACTIONS_COLUMN, WINDOW_DURATION_COLUMN, WINDOW_END_INDEX_COLUMN,
    WINDOW_RATE_COLUMN, WINDOW_START_DATE_COLUMN, WINDOW_START_INDEX_COLUMN,
};
use chrono::Timelike;

/// Result of running the pipeline on one event set.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Trimmed, sorted events with derived columns appended
    pub events: EventColumnSet,
    /// Activity windows over `events`, in chronological order
    pub windows: Vec<ActivityWindow>,
    /// Minutes since the previous event, parallel to `events`
    pub gaps: Vec<Option<f64>>,
    /// Rows removed as leading noise
    pub rows_trimmed: usize,
}

impl PipelineOutput {
    pub fn record_type(&self) -> RecordType {
        self.events.record_type()
    }

    /// One row per activity window with the fixed metadata column layout.
    pub fn window_table(&self) -> Table {
        window_table(&self.windows)
    }
}

/// Build the window metadata table.
pub fn window_table(windows: &[ActivityWindow]) -> Table {
    let schema = Schema::new([
        WINDOW_START_DATE_COLUMN,
        WINDOW_START_INDEX_COLUMN,
        WINDOW_END_INDEX_COLUMN,
        WINDOW_DURATION_COLUMN,
        WINDOW_ACTIONS_COLUMN,
        WINDOW_RATE_COLUMN,
    ]);
    let columns = vec![
        Column::DateTime(windows.iter().map(|w| w.start_timestamp).collect()),
        Column::Int(windows.iter().map(|w| w.start_index as i64).collect()),
        Column::Int(windows.iter().map(|w| w.end_index as i64).collect()),
        Column::Float(windows.iter().map(|w| Some(w.duration_minutes)).collect()),
        Column::Int(windows.iter().map(|w| w.event_count as i64).collect()),
        Column::Float(windows.iter().map(|w| w.rate_per_10min).collect()),
    ];
    // Columns are built from one slice, so lengths always agree
    Table::new(schema, columns).unwrap_or_else(|e| unreachable!("window table: {e}"))
}

/// Runs trimming, segmentation and enrichment for one record type.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    detector: ChangepointDetector,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, changepoint: ChangepointConfig) -> Self {
        Self {
            config,
            detector: ChangepointDetector::new(changepoint),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pipeline.clone(), config.changepoint.clone())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on `events`.
    pub fn process(&self, events: EventColumnSet) -> Result<PipelineOutput> {
        let record_type = events.record_type();
        let input_rows = events.len();

        let sorted = events.sorted_by_timestamp();
        let trimmed = if self.config.trim_leading_noise {
            trim_leading_noise(sorted, &self.detector)
        } else {
            sorted
        };
        let rows_trimmed = input_rows - trimmed.len();

        let with_time = derive_time_columns(&trimmed)?;

        let segmentation = compute_windows(trimmed.timestamps(), self.config.interrupt_minutes);
        let windows = compute_window_stats(trimmed.timestamps(), &segmentation.windows)
            .into_windows(&segmentation.windows);

        let mut enriched =
            with_time.with_column(GAP_COLUMN, Column::Float(segmentation.gaps.clone()))?;
        if record_type.flags_short_form() {
            let flags = short_form_flags(&segmentation.gaps, self.config.short_form_minutes);
            enriched = enriched.with_column(SHORT_FORM_COLUMN, Column::Bool(flags))?;
        }

        tracing::info!(
            record_type = %record_type,
            input_rows,
            rows_trimmed,
            rows = enriched.len(),
            windows = windows.len(),
            interrupt_minutes = self.config.interrupt_minutes,
            "Pipeline complete"
        );

        Ok(PipelineOutput {
            events: enriched,
            windows,
            gaps: segmentation.gaps,
            rows_trimmed,
        })
    }
}

/// Run the pipeline on a raw table whose record type is known.
///
/// Fails with [`crate::Error::MalformedInput`] when the `Date` column or the
/// record type's discriminator column is missing from the schema.
pub fn process(table: Table, record_type: RecordType, config: &Config) -> Result<PipelineOutput> {
    let events = EventColumnSet::new(record_type, table)?;
    Pipeline::from_config(config).process(events)
}

/// Append `Weekday`, `Hour` and `Date Only`.
fn derive_time_columns(events: &EventColumnSet) -> Result<EventColumnSet> {
    let timestamps = events.timestamps();
    let weekdays = timestamps.iter().map(|ts| ts.format("%A").to_string()).collect();
    let hours = timestamps.iter().map(|ts| i64::from(ts.hour())).collect();
    let dates = timestamps.iter().map(|ts| ts.date()).collect();

    events
        .with_column(WEEKDAY_COLUMN, Column::Text(weekdays))?
        .with_column(HOUR_COLUMN, Column::Int(hours))?
        .with_column(DATE_ONLY_COLUMN, Column::Date(dates))
}

/// True where the gap to the previous event is known and below `threshold`.
pub fn short_form_flags(gaps: &[Option<f64>], threshold_minutes: f64) -> Vec<bool> {
    gaps.iter()
        .map(|gap| matches!(gap, Some(minutes) if *minutes < threshold_minutes))
        .collect()
}
