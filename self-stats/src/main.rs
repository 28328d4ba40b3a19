//! self-stats - Personal Activity Analytics CLI
//!
//! Turns Google Takeout search and watch history exports into activity
//! windows, daily tables and a summary of when and how you browse.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use self_stats_core::analytics::{summarize, ActivitySummary, TimePatterns};
use self_stats_core::config::ExportFormat;
use self_stats_core::export::export_all;
use self_stats_core::{Config, IngestCoordinator, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "self-stats")]
#[command(about = "Activity windows and summaries from your Takeout history")]
#[command(version)]
struct Args {
    /// Directory containing MyActivity and/or watch-history exports (JSON or HTML)
    #[arg(long, default_value = "personal_data")]
    dir: PathBuf,

    /// Config file (default: ~/.config/self-stats/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Longest gap in minutes that still continues an activity window
    #[arg(long)]
    interrupt_minutes: Option<u32>,

    /// Zone for JSON export times: local, utc or an offset like -05:00
    #[arg(long)]
    time_zone: Option<String>,

    /// Minimum relative change in daily activity to trim leading noise
    #[arg(long)]
    threshold: Option<f64>,

    /// Gaps shorter than this many minutes mark a short-form video
    #[arg(long)]
    short_form_minutes: Option<f64>,

    /// Keep the leading low-activity period instead of trimming it
    #[arg(long)]
    no_trim: bool,

    /// Table export format (csv or json)
    #[arg(long)]
    export: Option<ExportFormat>,

    /// Summary format
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    summary: SummaryFormat,

    /// Process and summarize without writing any files
    #[arg(long)]
    dry_run: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Text,
    Md,
    Json,
}

/// Summary of one processed export file.
struct Report {
    source: PathBuf,
    summary: ActivitySummary,
    written: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    let _log_guard = match self_stats_core::logging::init(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    };

    let loaded = IngestCoordinator::with_wall_clock(config.ingest.wall_clock()?)
        .load_all(&args.dir)
        .with_context(|| format!("failed to read exports from {}", args.dir.display()))?;

    for (path, error) in &loaded.errors {
        eprintln!("warning: skipped {}: {}", path.display(), error);
    }
    if loaded.exports.is_empty() {
        anyhow::bail!(
            "No search or watch history export found in {}. Expected MyActivity.json/.html or watch-history.json/.html",
            args.dir.display()
        );
    }

    tracing::info!(
        dir = %args.dir.display(),
        exports = loaded.exports.len(),
        events = loaded.total_events(),
        dropped = loaded.total_dropped(),
        "Loaded exports"
    );

    let pipeline = Pipeline::from_config(&config);
    let output_dir = args.dir.join(&config.export.output_dir_name);
    let mut reports = Vec::with_capacity(loaded.exports.len());
    let mut used_stems = HashSet::new();

    for export in loaded.exports {
        let stem = unique_stem(export.stem(), &mut used_stems);
        let source = export.file.path.clone();
        let extracted = export.result.events.table().clone();

        let output = pipeline
            .process(export.result.events)
            .with_context(|| format!("failed to process {}", source.display()))?;

        let written = if args.dry_run {
            Vec::new()
        } else {
            export_all(
                &output_dir,
                &stem,
                config.export.format,
                &extracted,
                &output,
            )
            .with_context(|| format!("failed to export tables for {}", source.display()))?
        };

        reports.push(Report {
            source,
            summary: summarize(&output),
            written,
        });
    }

    match args.summary {
        SummaryFormat::Json => print_json(&reports)?,
        SummaryFormat::Md => print_markdown(&reports),
        SummaryFormat::Text => print_terminal(&reports),
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    if let Some(zone) = &args.time_zone {
        config.ingest.time_zone = zone.clone();
    }
    if let Some(minutes) = args.interrupt_minutes {
        config.pipeline.interrupt_minutes = minutes;
    }
    if let Some(minutes) = args.short_form_minutes {
        config.pipeline.short_form_minutes = minutes;
    }
    if let Some(threshold) = args.threshold {
        config.changepoint.min_relative_change = threshold;
    }
    if args.no_trim {
        config.pipeline.trim_leading_noise = false;
    }
    if let Some(format) = args.export {
        config.export.format = format;
    }

    config.validate().context("invalid settings")?;
    Ok(config)
}

fn print_terminal(reports: &[Report]) {
    for report in reports {
        let summary = &report.summary;
        let title = format!("{} ({})", summary.record_type.display_name(), file_name(&report.source));

        println!();
        println!("╭{}╮", "─".repeat(60));
        println!("│{:^60}│", title);
        println!("╰{}╯", "─".repeat(60));
        println!();

        if summary.totals.events == 0 {
            println!("  No activity found in this export.");
            println!();
            continue;
        }

        println!("SUMMARY");
        println!(
            "   Events:   {:<12} Trimmed: {}",
            summary.totals.events, summary.totals.rows_trimmed
        );
        println!(
            "   Windows:  {:<12} Time in windows: {}",
            summary.totals.windows,
            summary.totals.duration_display()
        );
        if let Some(rate) = summary.totals.mean_rate_per_10min {
            println!("   Pace:     {:.1} actions per 10 minutes", rate);
        }
        println!();

        let patterns = &summary.time_patterns;
        println!("TIME PATTERNS");
        println!(
            "   Peak hour:    {}",
            TimePatterns::hour_display(patterns.peak_hour)
        );
        println!(
            "   Busiest day:  {}",
            TimePatterns::day_name(patterns.busiest_day)
        );
        println!(
            "   Quietest day: {}",
            TimePatterns::day_name(patterns.quietest_day)
        );
        if let Some(window) = &patterns.longest_window {
            println!(
                "   Longest:      {} - {:.0} min, {} actions",
                window.start_timestamp.format("%b %d %Y %H:%M"),
                window.duration_minutes,
                window.event_count
            );
        }
        println!();

        let streaks = &summary.streaks;
        println!("STREAKS");
        let streak_dates = match (&streaks.longest_streak_start, &streaks.longest_streak_end) {
            (Some(start), Some(end)) => {
                format!(" ({} - {})", start.format("%b %d"), end.format("%b %d"))
            }
            _ => String::new(),
        };
        println!(
            "   Longest:  {} day{}{}",
            streaks.longest_streak_days,
            if streaks.longest_streak_days == 1 { "" } else { "s" },
            streak_dates
        );
        println!(
            "   Active:   {} of {} days ({:.0}%)",
            streaks.active_days,
            streaks.total_days,
            streaks.activity_percentage()
        );
        println!();

        if !report.written.is_empty() {
            println!("WROTE");
            for path in &report.written {
                println!("   {}", path.display());
            }
            println!();
        }
    }
}

fn print_markdown(reports: &[Report]) {
    println!("# Activity Summary");
    println!();

    for report in reports {
        let summary = &report.summary;
        println!(
            "## {} (`{}`)",
            summary.record_type.display_name(),
            file_name(&report.source)
        );
        println!();

        if summary.totals.events == 0 {
            println!("*No activity found in this export.*");
            println!();
            continue;
        }

        println!("| Metric | Value |");
        println!("|--------|-------|");
        println!("| Events | {} |", summary.totals.events);
        println!("| Rows Trimmed | {} |", summary.totals.rows_trimmed);
        println!("| Activity Windows | {} |", summary.totals.windows);
        println!("| Time in Windows | {} |", summary.totals.duration_display());
        if let Some(rate) = summary.totals.mean_rate_per_10min {
            println!("| Actions per 10 min | {:.1} |", rate);
        }
        println!();

        let patterns = &summary.time_patterns;
        println!("### Time Patterns");
        println!();
        println!(
            "- **Peak hour:** {}",
            TimePatterns::hour_display(patterns.peak_hour)
        );
        println!(
            "- **Busiest day:** {}",
            TimePatterns::day_name(patterns.busiest_day)
        );
        println!(
            "- **Quietest day:** {}",
            TimePatterns::day_name(patterns.quietest_day)
        );
        if let Some(window) = &patterns.longest_window {
            println!(
                "- **Longest window:** {} - {:.0} min, {} actions",
                window.start_timestamp.format("%b %d %Y %H:%M"),
                window.duration_minutes,
                window.event_count
            );
        }
        println!();

        let streaks = &summary.streaks;
        println!("### Streaks");
        println!();
        println!(
            "- **Longest streak:** {} days",
            streaks.longest_streak_days
        );
        println!(
            "- **Active days:** {} of {} ({:.0}%)",
            streaks.active_days,
            streaks.total_days,
            streaks.activity_percentage()
        );
        println!();
    }

    println!("---");
    println!("*Generated by self-stats*");
}

fn print_json(reports: &[Report]) -> Result<()> {
    let json: Vec<serde_json::Value> = reports
        .iter()
        .map(|report| {
            serde_json::json!({
                "source": report.source.display().to_string(),
                "summary": report.summary,
                "written": report
                    .written
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Suffix repeated stems (`watch-history-2`) so exports never overwrite each other.
fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    let mut candidate = stem.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}-{}", stem, n);
        n += 1;
    }
    candidate
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
