//! Common test utilities shared across all test modules
//!
//! Builders for synthetic payloads and series, plus helpers for scratch
//! files. Nothing here touches the network.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use fleetlog::state::CacheKey;
use fleetlog::time_align::DayClock;

/// Day used throughout the tests (2024-05-02, midnight UTC = 1_714_608_000_000)
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

pub fn test_clock() -> DayClock {
    DayClock::utc(test_date())
}

pub fn test_key(vehicle: &str) -> CacheKey {
    CacheKey::new(vehicle, test_date())
}

/// Create a scratch directory unique to this test process and `name`
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fleetlog-test-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Path to a fixture under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Test data generators for synthetic tests
pub mod synthetic {
    use fleetlog::state::{CanonicalPoint, SampleResolution, Series, SignalKind};
    use serde_json::{json, Value};

    /// Clock time `HH:MM:SS` for a second of the day
    pub fn clock_text(second_of_day: i64) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            second_of_day / 3600,
            (second_of_day / 60) % 60,
            second_of_day % 60
        )
    }

    /// Canonical digital series with one point per `step_ms`, alternating
    /// every ten points
    pub fn digital_series(id: &str, start: i64, count: usize, step_ms: i64) -> Series {
        let points = (0..count)
            .map(|i| CanonicalPoint::digital(start + i as i64 * step_ms, ((i / 10) % 2) as u8))
            .collect();
        Series {
            id: id.to_string(),
            name: id.to_string(),
            color: String::new(),
            kind: SignalKind::Digital,
            resolution: SampleResolution::PerSecond,
            unit: None,
            y_axis_range: Some((0.0, 1.0)),
            points,
            current_value: None,
            dropped_points: 0,
        }
    }

    /// Canonical analog series following a sawtooth with a fixed envelope
    pub fn analog_series(id: &str, start: i64, count: usize, step_ms: i64) -> Series {
        let points = (0..count)
            .map(|i| {
                let avg = (i % 97) as f64;
                CanonicalPoint::analog(
                    start + i as i64 * step_ms,
                    Some(avg),
                    Some(avg - 1.5),
                    Some(avg + 2.5),
                )
            })
            .collect();
        Series {
            id: id.to_string(),
            name: id.to_string(),
            color: String::new(),
            kind: SignalKind::Analog,
            resolution: SampleResolution::PerSecond,
            unit: Some("V".to_string()),
            y_axis_range: None,
            points,
            current_value: None,
            dropped_points: 0,
        }
    }

    /// Digital channel JSON with one point per second from `first_second`
    pub fn digital_channel_json(id: &str, first_second: i64, seconds: i64) -> Value {
        let points: Vec<Value> = (0..seconds)
            .map(|i| json!({"time": clock_text(first_second + i), "value": i % 2}))
            .collect();
        json!({"id": id, "name": format!("Input {}", id), "points": points})
    }

    /// Analog channel JSON with one point per second from `first_second`
    pub fn analog_channel_json(id: &str, first_second: i64, seconds: i64) -> Value {
        let points: Vec<Value> = (0..seconds)
            .map(|i| {
                json!({
                    "time": clock_text(first_second + i),
                    "avg": i as f64,
                    "min": i as f64 - 1.0,
                    "max": i as f64 + 1.0
                })
            })
            .collect();
        json!({"id": id, "name": format!("Sensor {}", id), "unit": "V", "points": points})
    }

    /// Payload with `digital` digital channels and `analog` per-second analog
    /// channels, all covering the same `seconds` from 08:00:00
    pub fn payload_json(digital: usize, analog: usize, seconds: i64) -> String {
        let start = 8 * 3600;
        let digital: Vec<Value> = (0..digital)
            .map(|i| digital_channel_json(&format!("D{}", i + 1), start, seconds))
            .collect();
        let analog: Vec<Value> = (0..analog)
            .map(|i| analog_channel_json(&format!("A{}", i + 1), start, seconds))
            .collect();
        json!({"digitalPerSecond": digital, "analogPerSecond": analog}).to_string()
    }
}
