//! JSON adapter for telemetry API payloads.
//!
//! The API (and its file fallback) is loose about shapes: arrays may be
//! missing or `null`, numbers may arrive as strings, and several field names
//! have historical aliases. This module is the single place where those
//! variations are resolved; everything downstream sees [`RawTelemetry`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{
    PayloadError, PayloadParser, RawAnalogChannel, RawAnalogPoint, RawDigitalChannel,
    RawDigitalPoint, RawGpsPoint, RawTelemetry, TimeInput,
};
use crate::state::SampleResolution;
use crate::units::Transform;

/// Top-level keys that mark an object as a telemetry payload (rather than an envelope)
const PAYLOAD_KEYS: &[&str] = &[
    "timestamps",
    "times",
    "digitalPerSecond",
    "analogPerSecond",
    "analogPerMinute",
    "gpsPerSecond",
];

/// Parser for the telemetry API's JSON payload
pub struct JsonPayload;

impl PayloadParser for JsonPayload {
    fn parse(&self, data: &str) -> Result<RawTelemetry, PayloadError> {
        let value: Value = serde_json::from_str(data)?;
        Self::from_value(value)
    }
}

impl JsonPayload {
    /// Decode an already-parsed JSON value, unwrapping the file-fallback
    /// envelope (`{device_id, date, generated_at, data}`) when present
    pub fn from_value(value: Value) -> Result<RawTelemetry, PayloadError> {
        let payload = unwrap_envelope(value)?;
        let wire: WirePayload = serde_json::from_value(payload)?;
        Ok(wire.into_raw())
    }
}

fn unwrap_envelope(value: Value) -> Result<Value, PayloadError> {
    let Value::Object(mut map) = value else {
        return Err(PayloadError::NotAnObject);
    };

    let is_payload = PAYLOAD_KEYS.iter().any(|key| map.contains_key(*key));
    if !is_payload {
        if let Some(inner) = map.remove("data") {
            if inner.is_object() {
                return Ok(inner);
            }
        }
    }

    Ok(Value::Object(map))
}

// ============================================================================
// Lenient Field Types
// ============================================================================

/// A scalar that may arrive as a number, a numeric string or a boolean
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Flex {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Flex {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Flex::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Flex::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Flex::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Flex::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Flex::Number(n) => n.to_string(),
            Flex::Bool(b) => b.to_string(),
            Flex::Text(s) => s.clone(),
        }
    }
}

fn flex_f64(value: &Option<Flex>) -> Option<f64> {
    value.as_ref().and_then(Flex::as_f64)
}

/// Deserialize a list, treating `null`/non-arrays as empty and skipping
/// entries that do not match the expected shape
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let total = entries.len();
    let items: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if items.len() < total {
        tracing::debug!(
            "Skipped {} malformed payload entries out of {}",
            total - items.len(),
            total
        );
    }

    Ok(items)
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    #[serde(default, alias = "times", deserialize_with = "lenient_list")]
    timestamps: Vec<WireTimestamp>,
    #[serde(default, alias = "digital_per_second", deserialize_with = "lenient_list")]
    digital_per_second: Vec<WireDigitalChannel>,
    #[serde(default, alias = "analog_per_second", deserialize_with = "lenient_list")]
    analog_per_second: Vec<WireAnalogChannel>,
    #[serde(default, alias = "analog_per_minute", deserialize_with = "lenient_list")]
    analog_per_minute: Vec<WireAnalogChannel>,
    #[serde(default, alias = "gps_per_second", deserialize_with = "lenient_list")]
    gps_per_second: Vec<WireGpsPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Plain(TimeInput),
    Object {
        #[serde(default)]
        time: Option<TimeInput>,
        #[serde(default)]
        timestamp: Option<TimeInput>,
    },
}

impl WireTimestamp {
    fn into_time(self) -> Option<TimeInput> {
        match self {
            WireTimestamp::Plain(time) => Some(time),
            // The absolute timestamp is preferred over the clock time
            WireTimestamp::Object { time, timestamp } => timestamp.or(time),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDigitalChannel {
    #[serde(default)]
    id: Option<Flex>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default, alias = "inverse")]
    inverted: Option<Flex>,
    #[serde(default, deserialize_with = "lenient_list")]
    points: Vec<WireDigitalPoint>,
}

#[derive(Debug, Deserialize)]
struct WireDigitalPoint {
    #[serde(default, alias = "timestamp", alias = "t")]
    time: Option<TimeInput>,
    #[serde(default, alias = "state")]
    value: Option<Flex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalogChannel {
    #[serde(default)]
    id: Option<Flex>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    resolution: Option<Flex>,
    #[serde(default)]
    offset: Option<Flex>,
    #[serde(default, alias = "y_axis_range")]
    y_axis_range: Option<WireRange>,
    #[serde(default, deserialize_with = "lenient_list")]
    points: Vec<WireAnalogPoint>,
}

#[derive(Debug, Deserialize)]
struct WireRange {
    #[serde(default)]
    min: Option<Flex>,
    #[serde(default)]
    max: Option<Flex>,
}

#[derive(Debug, Deserialize)]
struct WireAnalogPoint {
    #[serde(default, alias = "timestamp", alias = "t")]
    time: Option<TimeInput>,
    #[serde(default, alias = "average", alias = "avgValues", alias = "avgs")]
    avg: Option<Flex>,
    #[serde(default, alias = "minValues", alias = "mins", alias = "minimum")]
    min: Option<Flex>,
    #[serde(default, alias = "maxValues", alias = "maxs", alias = "maximum")]
    max: Option<Flex>,
    /// Single instantaneous reading, used as the average when none is given
    #[serde(default)]
    value: Option<Flex>,
}

#[derive(Debug, Deserialize)]
struct WireGpsPoint {
    #[serde(default, alias = "timestamp", alias = "t")]
    time: Option<TimeInput>,
    #[serde(default, alias = "latitude")]
    lat: Option<Flex>,
    #[serde(default, alias = "lon", alias = "long", alias = "longitude")]
    lng: Option<Flex>,
}

// ============================================================================
// Mapping onto Raw Types
// ============================================================================

fn missing_time() -> TimeInput {
    TimeInput::Text(String::new())
}

fn channel_id(id: Option<Flex>, prefix: char, index: usize) -> String {
    id.map(|id| id.as_text())
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("{}{}", prefix, index + 1))
}

impl WirePayload {
    fn into_raw(self) -> RawTelemetry {
        let sample_times = self
            .timestamps
            .into_iter()
            .filter_map(WireTimestamp::into_time)
            .collect();

        let digital = self
            .digital_per_second
            .into_iter()
            .enumerate()
            .map(|(index, channel)| channel.into_raw(index))
            .collect();

        let analog = self
            .analog_per_second
            .into_iter()
            .enumerate()
            .map(|(index, channel)| channel.into_raw(index, SampleResolution::PerSecond))
            .chain(
                self.analog_per_minute
                    .into_iter()
                    .enumerate()
                    .map(|(index, channel)| channel.into_raw(index, SampleResolution::PerMinute)),
            )
            .collect();

        let gps = self
            .gps_per_second
            .into_iter()
            .map(|point| RawGpsPoint {
                time: point.time.unwrap_or_else(missing_time),
                lat: flex_f64(&point.lat),
                lng: flex_f64(&point.lng),
            })
            .collect();

        RawTelemetry {
            sample_times,
            digital,
            analog,
            gps,
        }
    }
}

impl WireDigitalChannel {
    fn into_raw(self, index: usize) -> RawDigitalChannel {
        let id = channel_id(self.id, 'D', index);
        let points = self
            .points
            .into_iter()
            .map(|point| RawDigitalPoint {
                time: point.time.unwrap_or_else(missing_time),
                value: flex_f64(&point.value).map(|v| u8::from(v != 0.0)),
            })
            .collect();

        RawDigitalChannel {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            color: self.color.unwrap_or_default(),
            inverted: flex_f64(&self.inverted).is_some_and(|v| v != 0.0),
            points,
        }
    }
}

impl WireAnalogChannel {
    fn into_raw(self, index: usize, resolution: SampleResolution) -> RawAnalogChannel {
        let id = channel_id(self.id, 'A', index);
        let transform = Transform::new(
            flex_f64(&self.resolution).unwrap_or(1.0),
            flex_f64(&self.offset).unwrap_or(0.0),
        );
        let y_axis_range = self.y_axis_range.and_then(|range| {
            match (flex_f64(&range.min), flex_f64(&range.max)) {
                (Some(min), Some(max)) if min < max => Some((min, max)),
                _ => None,
            }
        });
        let points = self
            .points
            .into_iter()
            .map(|point| RawAnalogPoint {
                time: point.time.unwrap_or_else(missing_time),
                avg: flex_f64(&point.avg).or_else(|| flex_f64(&point.value)),
                min: flex_f64(&point.min),
                max: flex_f64(&point.max),
            })
            .collect();

        RawAnalogChannel {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            color: self.color.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            transform,
            y_axis_range,
            resolution,
            points,
        }
    }
}
