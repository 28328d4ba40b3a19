//! Field cleaning shared by the export parsers.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Control, format and separator characters plus zero-width marks.
static HIDDEN_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{C}\p{Z}\x{200B}-\x{200F}\x{2028}-\x{202F}]+").expect("valid regex")
});

/// `center=<lat>,<lng>` in a maps URL.
static MAP_CENTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"center=(-?[0-9.]+),(-?[0-9.]+)").expect("valid regex"));

/// Time zone abbreviation trailing an HTML export date (`... 6:22:10 PM EST`).
static ZONE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(AM|PM)\s*[A-Z]{2,4}$").expect("valid regex"));

/// Date layout of the HTML exports once the zone abbreviation is removed.
pub const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p";

/// Wall clock that UTC-stamped export times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallClock {
    /// The system's local time zone
    #[default]
    System,
    /// A fixed offset east of UTC
    Fixed(FixedOffset),
}

impl WallClock {
    pub fn utc() -> Self {
        WallClock::Fixed(Utc.fix())
    }

    /// Naive time as read on this wall clock.
    pub fn convert(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime {
        match self {
            WallClock::System => instant.with_timezone(&Local).naive_local(),
            WallClock::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

impl std::str::FromStr for WallClock {
    type Err = String;

    /// Accepts `local`, `utc`, or an offset such as `+05:30` or `-08:00`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "local" => return Ok(WallClock::System),
            "utc" | "z" => return Ok(WallClock::utc()),
            _ => {}
        }
        parse_offset(value)
            .map(WallClock::Fixed)
            .ok_or_else(|| format!("unknown time zone '{}', expected local, utc or +HH:MM", s))
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || !digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Collapse invisible characters and whitespace runs into single spaces.
pub fn clean_text(text: &str) -> String {
    HIDDEN_CHARS.replace_all(text, " ").trim().to_string()
}

/// Remove a leading phrase such as `"Watched "`, if present.
pub fn strip_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.strip_prefix(prefix).unwrap_or(text)
}

/// Parse an RFC 3339 export timestamp into naive time on `clock`.
///
/// JSON exports stamp every record in UTC. Sub-second precision is
/// truncated.
pub fn parse_timestamp(value: &str, clock: WallClock) -> Option<NaiveDateTime> {
    let parsed = DateTime::parse_from_rfc3339(value.trim()).ok()?;
    clock.convert(parsed).with_nanosecond(0)
}

/// Parse an HTML export date such as `Feb 3, 2024, 6:22:10 PM EST`.
///
/// The time is already local to the account, so the zone abbreviation is
/// dropped without conversion.
pub fn parse_display_timestamp(value: &str) -> Option<NaiveDateTime> {
    let cleaned = clean_text(value);
    let without_zone = ZONE_SUFFIX.replace(&cleaned, "$1");
    NaiveDateTime::parse_from_str(without_zone.trim(), DISPLAY_DATE_FORMAT).ok()
}

/// Latitude and longitude from a maps URL.
pub fn parse_coordinates(url: &str) -> Option<(f64, f64)> {
    let caps = MAP_CENTER.captures(url)?;
    let lat = caps.get(1)?.as_str().parse().ok()?;
    let lng = caps.get(2)?.as_str().parse().ok()?;
    Some((lat, lng))
}
