//! Dashboard integration tests
//!
//! Drives the dashboard the way the app does: begin a load, hand it the
//! decoded payload, process analog chunks frame by frame and interact with
//! the scrubber.

use std::sync::Arc;

use fleetlog::dashboard::{Dashboard, DashboardConfig};
use fleetlog::parsers::{JsonPayload, PayloadParser, RawTelemetry};
use fleetlog::scrubber::{DashboardEvent, Lane, ScrubberEvent};
use fleetlog::state::{LoadStatus, Padding, ViewMode, HOUR_MS, MAX_CHART_POINTS, MIN_RANGE_MS};

use crate::common::{synthetic, test_key};

const EIGHT_AM: i64 = 1_714_608_000_000 + 8 * 3_600_000;

fn payload(digital: usize, analog: usize, seconds: i64) -> RawTelemetry {
    JsonPayload
        .parse(&synthetic::payload_json(digital, analog, seconds))
        .unwrap()
}

fn dashboard_with_chunk(chunk: usize) -> Dashboard {
    Dashboard::new(DashboardConfig {
        analog_chunk_size: chunk,
        ..DashboardConfig::default()
    })
}

// ============================================
// Load Lifecycle Tests
// ============================================

#[test]
fn test_chunked_processing_reaches_ready() {
    let mut dashboard = dashboard_with_chunk(2);
    let ticket = dashboard.begin_load(test_key("KT-204"));
    assert_eq!(dashboard.status(), &LoadStatus::Loading);

    assert!(dashboard.accept_payload(&ticket, payload(2, 5, 120)));
    assert_eq!(dashboard.status(), &LoadStatus::Processing { done: 0, total: 5 });
    // Digital channels are visible before any analog chunk ran
    assert_eq!(dashboard.series().len(), 2);

    assert!(dashboard.process_frame());
    assert_eq!(dashboard.status(), &LoadStatus::Processing { done: 2, total: 5 });
    assert_eq!(dashboard.series().len(), 4);

    assert!(dashboard.process_frame());
    assert!(!dashboard.process_frame());

    assert_eq!(dashboard.status(), &LoadStatus::Ready);
    assert_eq!(dashboard.series().len(), 7);
    assert!(!dashboard.is_processing());
    assert!(!dashboard.process_frame());
}

#[test]
fn test_published_series_are_replaced_not_mutated() {
    let mut dashboard = dashboard_with_chunk(1);
    let ticket = dashboard.begin_load(test_key("KT-204"));
    dashboard.accept_payload(&ticket, payload(1, 2, 60));

    let before = dashboard.series();
    dashboard.process_frame();
    let after = dashboard.series();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 2);
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn test_payload_without_analog_is_ready_immediately() {
    let mut dashboard = Dashboard::default();
    let ticket = dashboard.begin_load(test_key("KT-204"));
    dashboard.accept_payload(&ticket, payload(3, 0, 60));
    assert_eq!(dashboard.status(), &LoadStatus::Ready);
    assert!(!dashboard.is_processing());
    assert!(dashboard.selection().is_some());
}

#[test]
fn test_empty_payload_is_empty_status() {
    let mut dashboard = Dashboard::default();
    let ticket = dashboard.begin_load(test_key("KT-204"));
    dashboard.accept_payload(&ticket, JsonPayload.parse("{}").unwrap());

    assert_eq!(dashboard.status(), &LoadStatus::Empty);
    assert!(dashboard.chart_domain().is_none());
    assert!(dashboard.visible_series().is_empty());
    assert!(dashboard.selection().is_none());
}

#[test]
fn test_channels_without_points_are_empty_status() {
    let mut dashboard = Dashboard::default();
    let ticket = dashboard.begin_load(test_key("KT-204"));
    let raw = JsonPayload
        .parse(r#"{"digitalPerSecond": [{"id": "D1", "points": []}], "analogPerSecond": [{"id": "A1", "points": []}]}"#)
        .unwrap();
    dashboard.accept_payload(&ticket, raw);
    while dashboard.process_frame() {}
    assert_eq!(dashboard.status(), &LoadStatus::Empty);
}

#[test]
fn test_stale_payload_is_rejected() {
    let mut dashboard = Dashboard::default();
    let old = dashboard.begin_load(test_key("KT-100"));
    let current = dashboard.begin_load(test_key("KT-204"));

    assert!(!dashboard.accept_payload(&old, payload(1, 0, 60)));
    assert_eq!(dashboard.status(), &LoadStatus::Loading);
    assert!(dashboard.series().is_empty());

    assert!(dashboard.accept_payload(&current, payload(1, 0, 60)));
    assert_eq!(dashboard.status(), &LoadStatus::Ready);
    assert_eq!(dashboard.current_key(), Some(&current.key));
}

#[test]
fn test_new_load_abandons_pending_chunks() {
    let mut dashboard = dashboard_with_chunk(1);
    let first = dashboard.begin_load(test_key("KT-100"));
    dashboard.accept_payload(&first, payload(0, 4, 60));
    dashboard.process_frame();

    let second = dashboard.begin_load(test_key("KT-204"));
    assert!(!dashboard.is_processing());
    assert!(!dashboard.process_frame());
    assert!(dashboard.series().is_empty());
    assert_eq!(second.generation, first.generation + 1);
}

#[test]
fn test_stale_failure_is_ignored() {
    let mut dashboard = Dashboard::default();
    let old = dashboard.begin_load(test_key("KT-100"));
    let current = dashboard.begin_load(test_key("KT-204"));

    dashboard.fail_load(&old, "timeout");
    assert_eq!(dashboard.status(), &LoadStatus::Loading);

    dashboard.fail_load(&current, "HTTP 500");
    assert_eq!(dashboard.status(), &LoadStatus::Failed("HTTP 500".to_string()));
}

#[test]
fn test_load_now_uses_cache() {
    let mut dashboard = Dashboard::default();
    let raw = payload(1, 2, 60);
    let events = dashboard.load_now(test_key("KT-204"), &raw);

    assert_eq!(dashboard.status(), &LoadStatus::Ready);
    assert_eq!(dashboard.series().len(), 3);
    assert!(events
        .iter()
        .any(|e| matches!(e, DashboardEvent::SelectionChanged(_))));
    assert!(events.contains(&DashboardEvent::PointerMoved(EIGHT_AM)));
}

// ============================================
// Interaction Tests
// ============================================

#[test]
fn test_initial_selection_covers_minimum_range() {
    let mut dashboard = Dashboard::default();
    dashboard.load_now(test_key("KT-204"), &payload(1, 0, 600));

    let selection = dashboard.selection().unwrap();
    assert_eq!(selection.start, EIGHT_AM);
    assert_eq!(selection.width(), MIN_RANGE_MS);
    assert_eq!(dashboard.pointer_time(), Some(EIGHT_AM));
}

#[test]
fn test_chart_domain_follows_selection() {
    let mut dashboard = Dashboard::default();
    dashboard.load_now(test_key("KT-204"), &payload(1, 1, 4 * 3_600));

    let selection = dashboard.selection().unwrap();
    assert_eq!(dashboard.chart_domain(), Some(selection.as_domain()));

    // Drag the right handle one hour towards the start
    dashboard.handle_pointer(ScrubberEvent::PointerDown {
        lane: Lane::Range,
        time: selection.end,
    });
    dashboard.handle_pointer(ScrubberEvent::PointerUp {
        time: selection.end - HOUR_MS,
    });

    let domain = dashboard.chart_domain().unwrap();
    assert_eq!(domain.end, selection.end - HOUR_MS);
    assert!(dashboard
        .visible_series()
        .iter()
        .all(|s| s.points.iter().all(|p| p.time <= domain.end + domain.width() / 10)));
}

#[test]
fn test_visible_series_is_cached_until_selection_changes() {
    let mut dashboard = Dashboard::default();
    dashboard.load_now(test_key("KT-204"), &payload(1, 1, 3 * 3_600));

    let first = dashboard.visible_series();
    let again = dashboard.visible_series();
    assert!(Arc::ptr_eq(&first, &again));

    let selection = dashboard.selection().unwrap();
    dashboard.handle_pointer(ScrubberEvent::PointerDown {
        lane: Lane::Range,
        time: selection.start,
    });
    dashboard.handle_pointer(ScrubberEvent::PointerUp {
        time: selection.start + HOUR_MS,
    });

    let after = dashboard.visible_series();
    assert!(!Arc::ptr_eq(&first, &after));
}

#[test]
fn test_per_minute_view_bounds_points() {
    let mut dashboard = Dashboard::new(DashboardConfig {
        view_mode: ViewMode::PerMinute,
        padding: Padding::Fixed(0),
        ..DashboardConfig::default()
    });
    dashboard.load_now(test_key("KT-204"), &payload(2, 0, 3 * 3_600));

    for series in dashboard.visible_series().iter() {
        assert!(series.points.len() <= MAX_CHART_POINTS);
    }

    dashboard.set_view_mode(ViewMode::PerSecond);
    for series in dashboard.visible_series().iter() {
        assert_eq!(series.points.len(), 3 * 3_600);
    }
}

#[test]
fn test_value_and_sample_index_at_pointer() {
    let mut dashboard = Dashboard::default();
    dashboard.load_now(test_key("KT-204"), &payload(1, 1, 600));

    // Analog average equals the second offset in the synthetic payload
    assert_eq!(dashboard.value_at("A1", EIGHT_AM + 42_500), Some(42.0));
    assert_eq!(dashboard.value_at("A1", EIGHT_AM - 1), None);
    assert_eq!(dashboard.value_at("missing", EIGHT_AM), None);

    assert_eq!(dashboard.sample_count(), 600);
    assert_eq!(dashboard.sample_index_at(EIGHT_AM + 42_500), Some(42));
    assert_eq!(dashboard.sample_index_at(EIGHT_AM - 1), None);
}

#[test]
fn test_ticks_lie_inside_chart_domain() {
    let mut dashboard = Dashboard::default();
    dashboard.load_now(test_key("KT-204"), &payload(1, 0, 2 * 3_600));

    let domain = dashboard.chart_domain().unwrap();
    let ticks = dashboard.ticks();
    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|t| domain.contains(*t)));
}
