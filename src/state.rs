//! Core data types and constants.
//!
//! This module contains the fundamental data structures shared by the
//! telemetry pipeline, the scrubber and the chart views: canonical points and
//! series, time domains, selection ranges and the palettes used to draw them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

// ============================================================================
// Constants
// ============================================================================

/// One second in milliseconds
pub const SECOND_MS: i64 = 1_000;

/// One minute in milliseconds
pub const MINUTE_MS: i64 = 60 * SECOND_MS;

/// One hour in milliseconds
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Minimum width of the selection range
pub const MIN_RANGE_MS: i64 = HOUR_MS;

/// Hit-test tolerance around a range handle, in data space
pub const HANDLE_TOLERANCE_MS: i64 = 15 * MINUTE_MS;

/// Cadence of axis ticks shared by the scrubber and every chart
pub const TICK_INTERVAL_MS: i64 = 10 * MINUTE_MS;

/// Upper bound on generated ticks before the interval is widened
pub const MAX_TICKS: usize = 200;

/// Maximum points to render per series in the aggregated (per-minute) view
pub const MAX_CHART_POINTS: usize = 300;

/// Default padding around the visible domain, as a fraction of its width
pub const DEFAULT_PADDING_FRACTION: f64 = 0.10;

/// Number of analog channels normalized per animation frame
pub const DEFAULT_ANALOG_CHUNK_SIZE: usize = 4;

/// Color palette for chart lines when a channel carries no color of its own
pub const CHART_COLORS: &[[u8; 3]] = &[
    [113, 120, 78],  // Olive green (primary)
    [191, 78, 48],   // Rust orange (accent)
    [71, 108, 155],  // Blue (info)
    [159, 166, 119], // Sage green (success)
    [253, 193, 73],  // Amber (warning)
    [135, 30, 28],   // Dark red (error)
    [246, 247, 235], // Cream
    [100, 149, 237], // Cornflower blue
    [255, 127, 80],  // Coral
    [144, 238, 144], // Light green
];

/// Colorblind-friendly palette (based on Wong's optimized palette)
pub const COLORBLIND_COLORS: &[[u8; 3]] = &[
    [0, 114, 178],   // Blue
    [230, 159, 0],   // Orange
    [0, 158, 115],   // Bluish green
    [204, 121, 167], // Reddish purple
    [86, 180, 233],  // Sky blue
    [213, 94, 0],    // Vermillion
    [240, 228, 66],  // Yellow
    [0, 0, 0],       // Black
    [136, 204, 238], // Light blue
    [153, 153, 153], // Gray
];

/// Parse a `#rrggbb` / `rrggbb` / `#rgb` color string as sent by the telemetry API
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

// ============================================================================
// Signals and Points
// ============================================================================

/// The kind of telemetry a series carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum SignalKind {
    Digital,
    Analog,
    #[strum(serialize = "GPS")]
    Gps,
}

/// Native sampling resolution of a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SampleResolution {
    #[strum(serialize = "per second")]
    PerSecond,
    #[strum(serialize = "per minute")]
    PerMinute,
}

impl SampleResolution {
    /// Grid granularity used to align timestamps of this resolution
    pub fn granularity_ms(&self) -> i64 {
        match self {
            SampleResolution::PerSecond => SECOND_MS,
            SampleResolution::PerMinute => MINUTE_MS,
        }
    }
}

/// Analog envelope sample. Fields are `None` when the device sent no sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AnalogSample {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AnalogSample {
    pub fn is_empty(&self) -> bool {
        self.avg.is_none() && self.min.is_none() && self.max.is_none()
    }

    /// Average, or the midpoint of the envelope when no average was recorded
    pub fn center(&self) -> Option<f64> {
        match (self.avg, self.min, self.max) {
            (Some(avg), _, _) => Some(avg),
            (None, Some(min), Some(max)) => Some((min + max) / 2.0),
            (None, Some(v), None) | (None, None, Some(v)) => Some(v),
            (None, None, None) => None,
        }
    }
}

/// Channel-specific payload of a canonical point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum PointValue {
    Digital(u8),
    Analog(AnalogSample),
    Gps { lat: f64, lng: f64 },
}

/// A point on the canonical time grid
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CanonicalPoint {
    /// Millisecond epoch timestamp, aligned to the series granularity
    pub time: i64,
    pub value: PointValue,
}

impl CanonicalPoint {
    pub fn digital(time: i64, value: u8) -> Self {
        Self {
            time,
            value: PointValue::Digital(value),
        }
    }

    pub fn analog(time: i64, avg: Option<f64>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            time,
            value: PointValue::Analog(AnalogSample { avg, min, max }),
        }
    }

    pub fn gps(time: i64, lat: f64, lng: f64) -> Self {
        Self {
            time,
            value: PointValue::Gps { lat, lng },
        }
    }

    /// The value plotted on the Y axis: digital state, analog average, GPS latitude
    pub fn primary(&self) -> Option<f64> {
        match self.value {
            PointValue::Digital(v) => Some(f64::from(v)),
            PointValue::Analog(sample) => sample.center(),
            PointValue::Gps { lat, .. } => Some(lat),
        }
    }

    pub fn analog_sample(&self) -> Option<AnalogSample> {
        match self.value {
            PointValue::Analog(sample) => Some(sample),
            _ => None,
        }
    }
}

// ============================================================================
// Series
// ============================================================================

/// A canonical, time-ascending, deduplicated telemetry channel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub color: String,
    pub kind: SignalKind,
    pub resolution: SampleResolution,
    /// Display unit (analog channels only)
    pub unit: Option<String>,
    /// Fixed Y axis range requested by the channel configuration
    pub y_axis_range: Option<(f64, f64)>,
    pub points: Vec<CanonicalPoint>,
    /// Primary value of the last point
    pub current_value: Option<f64>,
    /// Raw points discarded during normalization
    pub dropped_points: usize,
}

impl Series {
    /// Time span covered by this series, `None` when it has no points
    pub fn extent(&self) -> Option<TimeDomain> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(TimeDomain::new(first.time, last.time)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same channel with a replaced point list
    pub fn with_points(&self, points: Vec<CanonicalPoint>) -> Series {
        let current_value = points.last().and_then(CanonicalPoint::primary);
        Series {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            kind: self.kind,
            resolution: self.resolution,
            unit: self.unit.clone(),
            y_axis_range: self.y_axis_range,
            points,
            current_value,
            dropped_points: self.dropped_points,
        }
    }

    /// Latest point at or before `time`
    pub fn point_at(&self, time: i64) -> Option<&CanonicalPoint> {
        let idx = self.points.partition_point(|p| p.time <= time);
        idx.checked_sub(1).map(|i| &self.points[i])
    }
}

// ============================================================================
// Time Ranges
// ============================================================================

/// The `[start, end]` millisecond range shared by every chart's X axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeDomain {
    pub start: i64,
    pub end: i64,
}

impl TimeDomain {
    /// Create a domain, swapping the bounds if they arrive reversed
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn width(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn clamp(&self, time: i64) -> i64 {
        time.clamp(self.start, self.end)
    }

    pub fn union(&self, other: &TimeDomain) -> TimeDomain {
        TimeDomain {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// The user-chosen sub-interval of the data, manipulated via drag handles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    pub start: i64,
    pub end: i64,
}

impl SelectionRange {
    pub fn width(&self) -> i64 {
        self.end - self.start
    }

    pub fn contains(&self, time: i64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn as_domain(&self) -> TimeDomain {
        TimeDomain::new(self.start, self.end)
    }

    /// Initial selection for a freshly loaded data set: the whole extent,
    /// widened to the minimum range when the data is shorter.
    pub fn covering(extent: TimeDomain) -> Self {
        Self {
            start: extent.start,
            end: extent.end.max(extent.start + MIN_RANGE_MS),
        }
    }
}

/// Which part of the scrubber the pointer is currently dragging
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    LeftHandle,
    RightHandle,
    RangePan,
    Knob,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, DragState::None)
    }
}

// ============================================================================
// View Options
// ============================================================================

/// Chart view mode: raw per-second data or minute aggregates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum ViewMode {
    #[default]
    #[strum(serialize = "Per second")]
    PerSecond,
    #[strum(serialize = "Per minute")]
    PerMinute,
}

impl ViewMode {
    /// Point budget per series. Per-second view relies on windowing alone.
    pub fn render_budget(&self) -> Option<usize> {
        match self {
            ViewMode::PerSecond => None,
            ViewMode::PerMinute => Some(MAX_CHART_POINTS),
        }
    }

    /// Analog resolution preferred by this view
    pub fn analog_resolution(&self) -> SampleResolution {
        match self {
            ViewMode::PerSecond => SampleResolution::PerSecond,
            ViewMode::PerMinute => SampleResolution::PerMinute,
        }
    }
}

/// Padding added on both sides of the visible domain before slicing
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Padding {
    /// Fraction of the domain width
    Fraction(f64),
    /// Fixed number of milliseconds
    Fixed(i64),
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Fraction(DEFAULT_PADDING_FRACTION)
    }
}

impl Padding {
    pub fn amount_ms(&self, domain: &TimeDomain) -> i64 {
        match *self {
            Padding::Fraction(fraction) => (fraction.max(0.0) * domain.width() as f64) as i64,
            Padding::Fixed(ms) => ms.max(0),
        }
    }

    pub fn apply(&self, domain: &TimeDomain) -> TimeDomain {
        let pad = self.amount_ms(domain);
        TimeDomain::new(domain.start.saturating_sub(pad), domain.end.saturating_add(pad))
    }
}

// ============================================================================
// Selection Identity and Load State
// ============================================================================

/// Identifies one (vehicle, date) selection; the series cache is keyed by it
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub vehicle_id: String,
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(vehicle_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            date,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.vehicle_id, self.date)
    }
}

/// Lifecycle of the currently selected data set
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
    /// Nothing selected yet
    #[default]
    Idle,
    /// Waiting for the telemetry source
    Loading,
    /// Analog channels are being normalized chunk by chunk
    Processing { done: usize, total: usize },
    /// At least one series has points
    Ready,
    /// Normalization left no usable points
    Empty,
    /// The source or payload could not be read
    Failed(String),
}

/// Type of toast notification (determines color)
#[derive(Clone, Copy, Default)]
pub enum ToastType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastType {
    /// Get the background color for this toast type
    pub fn color(&self) -> [u8; 3] {
        match self {
            ToastType::Info => [71, 108, 155],
            ToastType::Success => [113, 120, 78],
            ToastType::Warning => [253, 193, 73],
            ToastType::Error => [135, 30, 28],
        }
    }

    /// Get the text color for this toast type
    pub fn text_color(&self) -> [u8; 3] {
        match self {
            ToastType::Warning => [30, 30, 30], // Dark text for amber background
            _ => [255, 255, 255],
        }
    }
}
