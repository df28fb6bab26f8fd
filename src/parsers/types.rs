use serde::Deserialize;
use thiserror::Error;

use crate::state::SampleResolution;
use crate::units::Transform;

/// A timestamp exactly as the telemetry source sent it
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    /// Epoch seconds or milliseconds (told apart by magnitude)
    Epoch(f64),
    /// ISO datetime, `HH:MM:SS` clock time, packed `HHMMSS` or a numeric string
    Text(String),
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl From<f64> for TimeInput {
    fn from(value: f64) -> Self {
        TimeInput::Epoch(value)
    }
}

impl From<i64> for TimeInput {
    fn from(value: i64) -> Self {
        TimeInput::Epoch(value as f64)
    }
}

/// Point-level parse failures. These never escalate past the point they
/// belong to: the point is dropped and the series keeps its other samples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unrecognized timestamp: {0:?}")]
    Timestamp(String),

    #[error("Clock time {0:?} requires a base date")]
    MissingBaseDate(String),

    #[error("Timestamp out of range: {0}")]
    TimestampRange(f64),

    #[error("Invalid {axis} coordinate: {value}")]
    Coordinate { axis: &'static str, value: f64 },
}

/// Errors for payloads that cannot be decoded at all
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telemetry payload must be a JSON object")]
    NotAnObject,
}

// ============================================================================
// Canonical Raw Points
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RawDigitalPoint {
    pub time: TimeInput,
    /// 0 or 1; `None` when the value could not be read
    pub value: Option<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawAnalogPoint {
    pub time: TimeInput,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawGpsPoint {
    pub time: TimeInput,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A digital input channel before normalization
#[derive(Clone, Debug, PartialEq)]
pub struct RawDigitalChannel {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Inverse-logic input: recorded 0 means "on"
    pub inverted: bool,
    pub points: Vec<RawDigitalPoint>,
}

/// An analog channel before normalization
#[derive(Clone, Debug, PartialEq)]
pub struct RawAnalogChannel {
    pub id: String,
    pub name: String,
    pub color: String,
    pub unit: String,
    pub transform: Transform,
    pub y_axis_range: Option<(f64, f64)>,
    pub resolution: SampleResolution,
    pub points: Vec<RawAnalogPoint>,
}

/// Everything the telemetry source returned for one vehicle and day, mapped
/// onto canonical raw types
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTelemetry {
    /// Sample instants listed by the source, independent of any channel
    pub sample_times: Vec<TimeInput>,
    pub digital: Vec<RawDigitalChannel>,
    pub analog: Vec<RawAnalogChannel>,
    pub gps: Vec<RawGpsPoint>,
}

impl RawTelemetry {
    pub fn is_empty(&self) -> bool {
        self.digital.is_empty() && self.analog.is_empty() && self.gps.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.digital.len() + self.analog.len() + usize::from(!self.gps.is_empty())
    }
}

/// Trait for decoding a telemetry payload
pub trait PayloadParser {
    fn parse(&self, data: &str) -> Result<RawTelemetry, PayloadError>;
}
