//! Tests for visible-window extraction
//!
//! Tests cover:
//! - Per-second view keeps every point inside the padded window
//! - Per-minute view enforces the chart point budget
//! - Padding behavior and empty windows

use fleetlog::state::{Padding, TimeDomain, ViewMode, HOUR_MS, MAX_CHART_POINTS, MINUTE_MS};
use fleetlog::window::{extract_window, slice_range};

use crate::common::synthetic;

const SECONDS: usize = 100_000;

#[test]
fn test_per_second_view_keeps_all_points_in_window() {
    let series = synthetic::digital_series("D1", 0, SECONDS, 1_000);
    let domain = TimeDomain::new(10 * HOUR_MS, 12 * HOUR_MS);

    let window = extract_window(
        &series,
        &domain,
        Padding::Fixed(0),
        ViewMode::PerSecond.render_budget(),
    );

    // Two hours of per-second data, both ends inclusive
    assert_eq!(window.points.len(), 7_201);
    assert_eq!(window.points.first().map(|p| p.time), Some(domain.start));
    assert_eq!(window.points.last().map(|p| p.time), Some(domain.end));
}

#[test]
fn test_per_minute_view_respects_budget() {
    let series = synthetic::digital_series("D1", 0, SECONDS, 1_000);
    let domain = TimeDomain::new(10 * HOUR_MS, 12 * HOUR_MS);

    let window = extract_window(
        &series,
        &domain,
        Padding::default(),
        ViewMode::PerMinute.render_budget(),
    );

    assert!(window.points.len() <= MAX_CHART_POINTS);
    assert!(window.points.windows(2).all(|w| w[0].time < w[1].time));
}

#[test]
fn test_padding_extends_window() {
    let series = synthetic::digital_series("D1", 0, SECONDS, 1_000);
    let domain = TimeDomain::new(10 * HOUR_MS, 11 * HOUR_MS);

    let window = extract_window(&series, &domain, Padding::Fraction(0.1), None);

    assert_eq!(window.points.first().map(|p| p.time), Some(domain.start - 6 * MINUTE_MS));
    assert_eq!(window.points.last().map(|p| p.time), Some(domain.end + 6 * MINUTE_MS));
}

#[test]
fn test_window_outside_data_is_empty_series() {
    let series = synthetic::analog_series("A1", 0, 1_000, 1_000);
    let domain = TimeDomain::new(5 * HOUR_MS, 6 * HOUR_MS);

    let window = extract_window(&series, &domain, Padding::default(), Some(MAX_CHART_POINTS));

    assert!(window.is_empty());
    assert_eq!(window.id, "A1");
    assert_eq!(window.current_value, None);
}

#[test]
fn test_window_keeps_metadata() {
    let series = synthetic::analog_series("A7", 0, 10_000, 1_000);
    let window = extract_window(
        &series,
        &TimeDomain::new(0, HOUR_MS),
        Padding::default(),
        Some(50),
    );
    assert_eq!(window.unit, series.unit);
    assert_eq!(window.kind, series.kind);
    assert!(window.points.len() <= 50);
}

#[test]
fn test_slice_is_subslice_of_input() {
    let series = synthetic::digital_series("D1", 0, 100, 1_000);
    let slice = slice_range(&series.points, &TimeDomain::new(10_500, 20_500));
    assert_eq!(slice.len(), 10);
    assert_eq!(slice[0].time, 11_000);
}
