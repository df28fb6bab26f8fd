//! Payload integration tests
//!
//! Decodes a full cache file and runs it through normalization, checking the
//! series a dashboard would receive.

use fleetlog::dashboard::series_for_view;
use fleetlog::domain::data_extent;
use fleetlog::normalize::{normalize, normalize_sample_times, GPS_SERIES_ID};
use fleetlog::parsers::{JsonPayload, PayloadParser};
use fleetlog::state::{SampleResolution, Series, SignalKind, ViewMode, MINUTE_MS};
use fleetlog::units::CoordinateConvention;

use crate::common::{fixture_path, synthetic, test_clock};

const EIGHT_AM: i64 = 1_714_608_000_000 + 8 * 3_600_000;

fn load_fixture() -> Vec<Series> {
    let path = fixture_path("KT-204_2024-05-02.json");
    let body = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e));
    let raw = JsonPayload.parse(&body).expect("fixture should decode");
    normalize(&raw, &test_clock(), &CoordinateConvention::default())
}

fn find<'a>(series: &'a [Series], id: &str, resolution: SampleResolution) -> &'a Series {
    series
        .iter()
        .find(|s| s.id == id && s.resolution == resolution)
        .unwrap_or_else(|| panic!("missing series {} ({})", id, resolution))
}

#[test]
fn test_fixture_series_layout() {
    let series = load_fixture();
    let ids: Vec<(&str, SignalKind)> = series.iter().map(|s| (s.id.as_str(), s.kind)).collect();
    assert_eq!(
        ids,
        vec![
            ("D1", SignalKind::Digital),
            ("D2", SignalKind::Digital),
            ("A1", SignalKind::Analog),
            ("A1", SignalKind::Analog),
            ("A2", SignalKind::Analog),
            (GPS_SERIES_ID, SignalKind::Gps),
        ]
    );
}

#[test]
fn test_fixture_every_series_is_canonical() {
    for series in load_fixture() {
        let granularity = series.resolution.granularity_ms();
        assert!(
            series.points.windows(2).all(|w| w[0].time < w[1].time),
            "{} not strictly ascending",
            series.id
        );
        assert!(series.points.iter().all(|p| p.time % granularity == 0));
    }
}

#[test]
fn test_fixture_inverted_door_input() {
    let series = load_fixture();
    let door = find(&series, "D2", SampleResolution::PerSecond);
    let values: Vec<f64> = door.points.iter().filter_map(|p| p.primary()).collect();
    assert_eq!(values, vec![0.0, 1.0, 0.0]);
}

#[test]
fn test_fixture_battery_values() {
    let series = load_fixture();
    let battery = find(&series, "A1", SampleResolution::PerSecond);

    assert_eq!(battery.points.len(), 4);
    assert_eq!(battery.dropped_points, 1);
    assert_eq!(battery.unit.as_deref(), Some("V"));
    assert_eq!(battery.y_axis_range, Some((0.0, 30.0)));

    // Duplicate second keeps the later reading
    let second = battery.points[1].primary().unwrap();
    assert!((second - 23.99).abs() < 1e-9);

    // Missing average falls back to the envelope center
    let third = battery.points[2].primary().unwrap();
    assert!((third - 23.9).abs() < 1e-9);
}

#[test]
fn test_fixture_coolant_offset() {
    let series = load_fixture();
    let coolant = find(&series, "A2", SampleResolution::PerMinute);
    let values: Vec<f64> = coolant.points.iter().filter_map(|p| p.primary()).collect();
    assert_eq!(values, vec![80.0, 84.0]);
    assert_eq!(coolant.points[1].time, EIGHT_AM + MINUTE_MS);
}

#[test]
fn test_fixture_gps_drops_invalid_fix() {
    let series = load_fixture();
    let gps = find(&series, GPS_SERIES_ID, SampleResolution::PerSecond);
    assert_eq!(gps.points.len(), 2);
    assert_eq!(gps.dropped_points, 1);
    for point in &gps.points {
        let lat = point.primary().unwrap();
        assert!((lat - (-33.8688)).abs() < 1e-3);
    }
}

#[test]
fn test_fixture_extent_and_sample_times() {
    let path = fixture_path("KT-204_2024-05-02.json");
    let raw = JsonPayload
        .parse(&std::fs::read_to_string(path).unwrap())
        .unwrap();
    let series = normalize(&raw, &test_clock(), &CoordinateConvention::default());

    let extent = data_extent(&series).unwrap();
    assert_eq!(extent.start, EIGHT_AM);
    assert_eq!(extent.end, EIGHT_AM + MINUTE_MS);

    let sample_times = normalize_sample_times(&raw.sample_times, &test_clock());
    assert_eq!(sample_times.len(), 6);
    assert_eq!(sample_times[0], EIGHT_AM);
}

#[test]
fn test_view_mode_picks_analog_resolution() {
    let series = load_fixture();

    let per_second = series_for_view(&series, ViewMode::PerSecond);
    let battery: Vec<&&Series> = per_second.iter().filter(|s| s.id == "A1").collect();
    assert_eq!(battery.len(), 1);
    assert_eq!(battery[0].resolution, SampleResolution::PerSecond);
    // Coolant only exists per minute and is still shown
    assert!(per_second.iter().any(|s| s.id == "A2"));

    let per_minute = series_for_view(&series, ViewMode::PerMinute);
    let battery: Vec<&&Series> = per_minute.iter().filter(|s| s.id == "A1").collect();
    assert_eq!(battery.len(), 1);
    assert_eq!(battery[0].resolution, SampleResolution::PerMinute);
    assert_eq!(per_minute.len(), 5);
}

#[test]
fn test_synthetic_full_day_payload() {
    let json = synthetic::payload_json(2, 3, 600);
    let raw = JsonPayload.parse(&json).unwrap();
    let series = normalize(&raw, &test_clock(), &CoordinateConvention::default());

    assert_eq!(series.len(), 5);
    assert!(series.iter().all(|s| s.points.len() == 600));
    assert!(series.iter().all(|s| s.dropped_points == 0));
}
