//! Tests for timestamp parsing and grid alignment
//!
//! Tests cover:
//! - Epoch seconds vs. milliseconds detection
//! - ISO, clock-time and packed-time inputs
//! - Floor alignment to second and minute grids
//! - Invalid inputs being dropped

use chrono::NaiveDate;
use fleetlog::parsers::{ParseError, TimeInput};
use fleetlog::state::{HOUR_MS, MINUTE_MS, SECOND_MS};
use fleetlog::time_align::{align_input, align_to_grid, epoch_to_ms, parse_timestamp, DayClock};

use crate::common::test_clock;

const MIDNIGHT: i64 = 1_714_608_000_000;

// ============================================
// Epoch Tests
// ============================================

#[test]
fn test_epoch_seconds_are_scaled() {
    assert_eq!(epoch_to_ms(1_714_608_000.0).unwrap(), MIDNIGHT);
}

#[test]
fn test_epoch_millis_pass_through() {
    assert_eq!(epoch_to_ms(1_714_608_000_123.0).unwrap(), MIDNIGHT + 123);
}

#[test]
fn test_epoch_rejects_non_finite() {
    assert!(matches!(
        epoch_to_ms(f64::NAN),
        Err(ParseError::TimestampRange(_))
    ));
    assert!(epoch_to_ms(f64::INFINITY).is_err());
}

#[test]
fn test_numeric_string_is_epoch() {
    let ms = parse_timestamp(&TimeInput::from("1714608000"), None);
    // Six digits or fewer are packed clock times, longer strings are epochs
    assert_eq!(ms.unwrap(), MIDNIGHT);
}

// ============================================
// Text Timestamp Tests
// ============================================

#[test]
fn test_rfc3339_with_offset() {
    let ms = parse_timestamp(&TimeInput::from("2024-05-02T10:00:00+10:00"), None).unwrap();
    assert_eq!(ms, MIDNIGHT);
}

#[test]
fn test_naive_iso_uses_clock_offset() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let clock = DayClock::with_offset_minutes(date, 120);
    let ms = parse_timestamp(&TimeInput::from("2024-05-02 02:00:00"), Some(&clock)).unwrap();
    assert_eq!(ms, MIDNIGHT);
}

#[test]
fn test_clock_time_on_selected_day() {
    let clock = test_clock();
    let ms = parse_timestamp(&TimeInput::from("08:30:15"), Some(&clock)).unwrap();
    assert_eq!(ms, MIDNIGHT + 8 * HOUR_MS + 30 * MINUTE_MS + 15 * SECOND_MS);
}

#[test]
fn test_clock_time_with_fraction() {
    let clock = test_clock();
    let ms = parse_timestamp(&TimeInput::from("00:00:01.250"), Some(&clock)).unwrap();
    assert_eq!(ms, MIDNIGHT + 1_250);
}

#[test]
fn test_packed_clock_time() {
    let clock = test_clock();
    let ms = parse_timestamp(&TimeInput::from("83015"), Some(&clock)).unwrap();
    assert_eq!(ms, MIDNIGHT + 8 * HOUR_MS + 30 * MINUTE_MS + 15 * SECOND_MS);
}

#[test]
fn test_clock_time_needs_base_date() {
    assert!(matches!(
        parse_timestamp(&TimeInput::from("08:30:15"), None),
        Err(ParseError::MissingBaseDate(_))
    ));
}

#[test]
fn test_garbage_is_rejected() {
    let clock = test_clock();
    for text in ["", "yesterday", "12:3", "2024-13-45"] {
        assert!(
            parse_timestamp(&TimeInput::from(text), Some(&clock)).is_err(),
            "{:?} should not parse",
            text
        );
    }
}

#[test]
fn test_non_ascii_digits_are_rejected() {
    let clock = test_clock();
    for text in ["１", "１２", "０８:００:００", "08:00:0٣", "08３０00"] {
        assert!(
            matches!(
                parse_timestamp(&TimeInput::from(text), Some(&clock)),
                Err(ParseError::Timestamp(_))
            ),
            "{:?} should not parse",
            text
        );
    }
}

// ============================================
// Alignment Tests
// ============================================

#[test]
fn test_align_floors_to_second() {
    assert_eq!(align_to_grid(MIDNIGHT + 1_999, SECOND_MS), MIDNIGHT + 1_000);
}

#[test]
fn test_align_floors_to_minute() {
    assert_eq!(align_to_grid(MIDNIGHT + 119_999, MINUTE_MS), MIDNIGHT + MINUTE_MS);
}

#[test]
fn test_align_pre_epoch_rounds_down() {
    assert_eq!(align_to_grid(-1, SECOND_MS), -1_000);
}

#[test]
fn test_align_is_idempotent() {
    let once = align_to_grid(MIDNIGHT + 12_345, SECOND_MS);
    assert_eq!(align_to_grid(once, SECOND_MS), once);
}

#[test]
fn test_align_input_drops_invalid() {
    let clock = test_clock();
    assert_eq!(align_input(&TimeInput::from("not a time"), Some(&clock), SECOND_MS), None);
    assert_eq!(
        align_input(&TimeInput::Epoch(1_714_608_000.7), Some(&clock), SECOND_MS),
        Some(MIDNIGHT)
    );
}

// ============================================
// Formatting Tests
// ============================================

#[test]
fn test_format_in_local_offset() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let clock = DayClock::with_offset_minutes(date, 600);
    assert_eq!(clock.format_hm(MIDNIGHT), "10:00");
    assert_eq!(clock.format_time(MIDNIGHT + 5 * SECOND_MS), "10:00:05");
}

#[test]
fn test_invalid_offset_falls_back_to_utc() {
    let clock = DayClock::with_offset_minutes(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 5_000);
    assert_eq!(clock.midnight_ms(), MIDNIGHT);
}
