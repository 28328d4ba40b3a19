//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/self-stats/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/self-stats/` (~/.config/self-stats/)
//! - State/Logs: `$XDG_STATE_HOME/self-stats/` (~/.local/state/self-stats/)

use crate::error::{Error, Result};
use crate::ingest::WallClock;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// File name prefix of the rotating log files
pub const LOG_FILE_PREFIX: &str = "self-stats";

/// File name suffix of the rotating log files
pub const LOG_FILE_SUFFIX: &str = "log";

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Export reading settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Activity window settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Leading-noise changepoint settings
    #[serde(default)]
    pub changepoint: ChangepointConfig,

    /// Output table settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Export reading configuration
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Zone JSON export times (stamped in UTC) are shown in: `local`, `utc`
    /// or a fixed offset such as `-05:00`
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

impl IngestConfig {
    /// Parsed [`WallClock`] for `time_zone`.
    pub fn wall_clock(&self) -> Result<WallClock> {
        self.time_zone
            .parse()
            .map_err(|e| Error::Config(format!("ingest.time_zone: {}", e)))
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        self.wall_clock().map(|_| ())
    }
}

fn default_time_zone() -> String {
    "local".to_string()
}

/// Activity window and enrichment configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Longest gap (minutes) between two events of the same activity window
    #[serde(default = "default_interrupt_minutes")]
    pub interrupt_minutes: u32,

    /// Watch events preceded by a gap shorter than this are short-form videos
    #[serde(default = "default_short_form_minutes")]
    pub short_form_minutes: f64,

    /// Run changepoint trimming before segmentation
    #[serde(default = "default_true")]
    pub trim_leading_noise: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interrupt_minutes: default_interrupt_minutes(),
            short_form_minutes: default_short_form_minutes(),
            trim_leading_noise: true,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.short_form_minutes.is_finite() || self.short_form_minutes < 0.0 {
            return Err(Error::Config(
                "pipeline.short_form_minutes must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_interrupt_minutes() -> u32 {
    20
}

fn default_short_form_minutes() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

/// Binary-segmentation changepoint configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChangepointConfig {
    /// Minimum fractional change in mean daily count (0.05 = 5%) for a
    /// detected shift to count as real
    #[serde(default = "default_min_relative_change")]
    pub min_relative_change: f64,

    /// Minimum number of days on each side of a split
    #[serde(default = "default_min_segment_len")]
    pub min_segment_len: usize,

    /// Only split indices that are multiples of this stride are tried
    #[serde(default = "default_jump")]
    pub jump: usize,
}

impl Default for ChangepointConfig {
    fn default() -> Self {
        Self {
            min_relative_change: default_min_relative_change(),
            min_segment_len: default_min_segment_len(),
            jump: default_jump(),
        }
    }
}

impl ChangepointConfig {
    /// Config with a custom significance threshold and default search grid.
    pub fn with_threshold(min_relative_change: f64) -> Self {
        Self {
            min_relative_change,
            ..Default::default()
        }
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.min_segment_len == 0 {
            return Err(Error::Config(
                "changepoint.min_segment_len must be at least 1".to_string(),
            ));
        }
        if self.jump == 0 {
            return Err(Error::Config(
                "changepoint.jump must be at least 1".to_string(),
            ));
        }
        if self.min_relative_change.is_nan() || self.min_relative_change < 0.0 {
            return Err(Error::Config(
                "changepoint.min_relative_change must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_min_relative_change() -> f64 {
    0.05
}

fn default_min_segment_len() -> usize {
    2
}

fn default_jump() -> usize {
    1
}

/// Table file format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("unknown export format: {}", s)),
        }
    }
}

/// Output table configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Directory (relative to the input directory) receiving the tables
    #[serde(default = "default_output_dir_name")]
    pub output_dir_name: String,

    /// File format of the written tables
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir_name: default_output_dir_name(),
            format: ExportFormat::default(),
        }
    }
}

fn default_output_dir_name() -> String {
    "output".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;
        self.pipeline.validate()?;
        self.changepoint.validate()?;
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/self-stats/config.toml` (~/.config/self-stats/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("self-stats").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/self-stats/` (~/.local/state/self-stats/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("self-stats")
    }

    /// Returns the path of the log file written on `date`
    ///
    /// Logs rotate daily: `$XDG_STATE_HOME/self-stats/self-stats.YYYY-MM-DD.log`
    pub fn log_path(date: chrono::NaiveDate) -> PathBuf {
        Self::state_dir().join(format!(
            "{}.{}.{}",
            LOG_FILE_PREFIX,
            date.format("%Y-%m-%d"),
            LOG_FILE_SUFFIX
        ))
    }
}
