//! Timestamp parsing and grid alignment.
//!
//! Telemetry arrives with three kinds of timestamps: epoch numbers (seconds or
//! milliseconds), ISO datetimes, and bare clock times relative to the selected
//! day. Everything is converted to epoch milliseconds and snapped down to the
//! channel's grid (one second or one minute).

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use regex::Regex;

use crate::parsers::{ParseError, TimeInput};
use crate::state::{HOUR_MS, MINUTE_MS, SECOND_MS};

/// Epoch values below this magnitude are seconds, above it milliseconds
pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// Largest accepted absolute epoch in milliseconds (year ~33658)
const MAX_EPOCH_MS: f64 = 1e15;

/// `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fff`
static CLOCK_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{1,9}))?)?$")
        .expect("valid clock regex")
});

/// Packed device time `HHMMSS`, left zero-padded when shorter. ASCII digits
/// only, the padded text is split by byte offset.
static PACKED_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,6}$").expect("valid packed time regex"));

/// Naive datetime layouts, interpreted in the day clock's offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The selected day: base for clock-time timestamps and for labels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayClock {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl DayClock {
    /// Day clock in UTC
    pub fn utc(date: NaiveDate) -> Self {
        Self {
            date,
            offset: Utc.fix(),
        }
    }

    /// Day clock with a fixed offset from UTC in minutes (east positive).
    /// Offsets beyond ±24h fall back to UTC.
    pub fn with_offset_minutes(date: NaiveDate, minutes: i32) -> Self {
        match minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => Self { date, offset },
            None => {
                tracing::warn!("Ignoring invalid UTC offset of {} minutes", minutes);
                Self::utc(date)
            }
        }
    }

    fn offset_ms(&self) -> i64 {
        i64::from(self.offset.local_minus_utc()) * SECOND_MS
    }

    /// Local midnight of the selected day as epoch milliseconds
    pub fn midnight_ms(&self) -> i64 {
        naive_to_ms(self.date.and_time(NaiveTime::MIN), self.offset_ms())
    }

    /// Epoch milliseconds for a time of day on the selected day
    pub fn at(&self, hours: i64, minutes: i64, seconds: i64, millis: i64) -> i64 {
        self.midnight_ms() + hours * HOUR_MS + minutes * MINUTE_MS + seconds * SECOND_MS + millis
    }

    /// Format a timestamp as local `HH:MM:SS`
    pub fn format_time(&self, ms: i64) -> String {
        match DateTime::from_timestamp_millis(ms) {
            Some(utc) => utc.with_timezone(&self.offset).format("%H:%M:%S").to_string(),
            None => "--:--:--".to_string(),
        }
    }

    /// Format a timestamp as local `HH:MM`
    pub fn format_hm(&self, ms: i64) -> String {
        match DateTime::from_timestamp_millis(ms) {
            Some(utc) => utc.with_timezone(&self.offset).format("%H:%M").to_string(),
            None => "--:--".to_string(),
        }
    }
}

fn naive_to_ms(naive: NaiveDateTime, offset_ms: i64) -> i64 {
    naive.and_utc().timestamp_millis() - offset_ms
}

/// Snap a timestamp down to a multiple of `granularity_ms`.
///
/// Uses floor division so pre-epoch values also round towards the past.
/// A non-positive granularity leaves the timestamp untouched.
#[inline]
pub fn align_to_grid(ms: i64, granularity_ms: i64) -> i64 {
    if granularity_ms <= 0 {
        return ms;
    }
    ms.div_euclid(granularity_ms) * granularity_ms
}

/// Convert an epoch number to milliseconds, detecting seconds by magnitude
pub fn epoch_to_ms(value: f64) -> Result<i64, ParseError> {
    if !value.is_finite() {
        return Err(ParseError::TimestampRange(value));
    }
    let ms = if value.abs() < EPOCH_MILLIS_THRESHOLD {
        value * 1000.0
    } else {
        value
    };
    if ms.abs() > MAX_EPOCH_MS {
        return Err(ParseError::TimestampRange(value));
    }
    Ok(ms.floor() as i64)
}

/// Parse any supported timestamp representation into epoch milliseconds.
///
/// Clock times (`HH:MM:SS`, packed `HHMMSS`) need a day clock; without one
/// they fail with [`ParseError::MissingBaseDate`].
pub fn parse_timestamp(input: &TimeInput, clock: Option<&DayClock>) -> Result<i64, ParseError> {
    match input {
        TimeInput::Epoch(value) => epoch_to_ms(*value),
        TimeInput::Text(text) => parse_text(text.trim(), clock),
    }
}

fn parse_text(text: &str, clock: Option<&DayClock>) -> Result<i64, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Timestamp(String::new()));
    }

    if let Some(caps) = CLOCK_TIME.captures(text) {
        let hours: i64 = caps[1].parse().unwrap_or(i64::MAX);
        let minutes: i64 = caps[2].parse().unwrap_or(i64::MAX);
        let seconds: i64 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).unwrap_or(i64::MAX);
        let millis = caps.get(4).map_or(0, |m| fraction_to_millis(m.as_str()));
        return clock_time(text, hours, minutes, seconds, millis, clock);
    }

    if PACKED_TIME.is_match(text) {
        let padded = format!("{:0>6}", text);
        let field = |range: std::ops::Range<usize>| padded[range].parse::<i64>().unwrap_or(i64::MAX);
        return clock_time(text, field(0..2), field(2..4), field(4..6), 0, clock);
    }

    if let Ok(number) = text.parse::<f64>() {
        return epoch_to_ms(number);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.timestamp_millis());
    }

    let offset_ms = clock.map_or(0, DayClock::offset_ms);
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive_to_ms(naive, offset_ms));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(naive_to_ms(date.and_time(NaiveTime::MIN), offset_ms));
    }

    Err(ParseError::Timestamp(text.to_string()))
}

fn fraction_to_millis(digits: &str) -> i64 {
    let mut padded: String = digits.chars().take(3).collect();
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn clock_time(
    text: &str,
    hours: i64,
    minutes: i64,
    seconds: i64,
    millis: i64,
    clock: Option<&DayClock>,
) -> Result<i64, ParseError> {
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(ParseError::Timestamp(text.to_string()));
    }
    let clock = clock.ok_or_else(|| ParseError::MissingBaseDate(text.to_string()))?;
    Ok(clock.at(hours, minutes, seconds, millis))
}

/// Parse and align in one step. `None` marks an invalid point that callers
/// must drop rather than place at time zero.
pub fn align_input(input: &TimeInput, clock: Option<&DayClock>, granularity_ms: i64) -> Option<i64> {
    match parse_timestamp(input, clock) {
        Ok(ms) => Some(align_to_grid(ms, granularity_ms)),
        Err(e) => {
            tracing::trace!("Dropping point: {}", e);
            None
        }
    }
}
