//! Series normalization.
//!
//! Turns [`RawTelemetry`] into canonical [`Series`]: every point is aligned to
//! its channel's grid, numeric fields go through the unit transform, invalid
//! points are dropped and duplicate timestamps collapse to the last write.
//! The result for one (vehicle, date) selection is held by [`SeriesCache`].

use std::sync::Arc;

use thiserror::Error;

use crate::parsers::types::{RawAnalogChannel, RawDigitalChannel, RawGpsPoint};
use crate::parsers::{RawTelemetry, TimeInput};
use crate::state::{CacheKey, CanonicalPoint, SampleResolution, Series, SignalKind};
use crate::time_align::{align_input, DayClock};
use crate::units::{decode_coordinate, Axis, CoordinateConvention};

/// Identifier of the single series built from the GPS track
pub const GPS_SERIES_ID: &str = "gps";

/// Errors raised when classifying a normalization result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("No telemetry points for the selected vehicle and day")]
    EmptyDataset,
}

/// Normalize every channel of a payload.
///
/// Digital channels come first, then analog channels in payload order, then
/// the GPS track (when the payload has one).
pub fn normalize(
    raw: &RawTelemetry,
    clock: &DayClock,
    convention: &CoordinateConvention,
) -> Vec<Series> {
    let mut series: Vec<Series> = raw
        .digital
        .iter()
        .map(|channel| normalize_digital(channel, clock))
        .collect();

    series.extend(raw.analog.iter().map(|channel| normalize_analog(channel, clock)));

    if let Some(gps) = normalize_gps(&raw.gps, clock, convention) {
        series.push(gps);
    }

    series
}

/// Normalize one digital channel, applying inverse logic when flagged
pub fn normalize_digital(channel: &RawDigitalChannel, clock: &DayClock) -> Series {
    let granularity = SampleResolution::PerSecond.granularity_ms();
    let points: Vec<CanonicalPoint> = channel
        .points
        .iter()
        .filter_map(|point| {
            let time = align_input(&point.time, Some(clock), granularity)?;
            let value = point.value?;
            let value = if channel.inverted { 1 - value.min(1) } else { value.min(1) };
            Some(CanonicalPoint::digital(time, value))
        })
        .collect();

    build_series(
        SeriesMeta {
            id: &channel.id,
            name: &channel.name,
            color: &channel.color,
            kind: SignalKind::Digital,
            resolution: SampleResolution::PerSecond,
            unit: None,
            y_axis_range: Some((0.0, 1.0)),
        },
        channel.points.len(),
        points,
    )
}

/// Normalize one analog channel at its native resolution
pub fn normalize_analog(channel: &RawAnalogChannel, clock: &DayClock) -> Series {
    let granularity = channel.resolution.granularity_ms();
    let transform = channel.transform;
    let points: Vec<CanonicalPoint> = channel
        .points
        .iter()
        .filter_map(|point| {
            let time = align_input(&point.time, Some(clock), granularity)?;
            let avg = transform.apply(point.avg);
            let min = transform.apply(point.min);
            let max = transform.apply(point.max);
            if avg.is_none() && min.is_none() && max.is_none() {
                return None;
            }
            Some(CanonicalPoint::analog(time, avg, min, max))
        })
        .collect();

    let unit = Some(channel.unit.clone()).filter(|unit| !unit.is_empty());

    build_series(
        SeriesMeta {
            id: &channel.id,
            name: &channel.name,
            color: &channel.color,
            kind: SignalKind::Analog,
            resolution: channel.resolution,
            unit,
            y_axis_range: channel.y_axis_range,
        },
        channel.points.len(),
        points,
    )
}

/// Normalize the GPS track into one series. `None` when the payload has no
/// GPS points at all.
pub fn normalize_gps(
    points: &[RawGpsPoint],
    clock: &DayClock,
    convention: &CoordinateConvention,
) -> Option<Series> {
    if points.is_empty() {
        return None;
    }

    let granularity = SampleResolution::PerSecond.granularity_ms();
    let canonical: Vec<CanonicalPoint> = points
        .iter()
        .filter_map(|point| {
            let time = align_input(&point.time, Some(clock), granularity)?;
            let lat = decode_coordinate(point.lat?, Axis::Latitude, convention)?;
            let lng = decode_coordinate(point.lng?, Axis::Longitude, convention)?;
            Some(CanonicalPoint::gps(time, lat, lng))
        })
        .collect();

    Some(build_series(
        SeriesMeta {
            id: GPS_SERIES_ID,
            name: "GPS",
            color: "",
            kind: SignalKind::Gps,
            resolution: SampleResolution::PerSecond,
            unit: Some("°".to_string()),
            y_axis_range: None,
        },
        points.len(),
        canonical,
    ))
}

/// Align the payload's standalone sample instants to whole seconds,
/// ascending and without duplicates
pub fn normalize_sample_times(times: &[TimeInput], clock: &DayClock) -> Vec<i64> {
    let granularity = SampleResolution::PerSecond.granularity_ms();
    let mut aligned: Vec<i64> = times
        .iter()
        .filter_map(|time| align_input(time, Some(clock), granularity))
        .collect();
    aligned.sort_unstable();
    aligned.dedup();
    aligned
}

/// Stable-sort by time and collapse equal timestamps to the last write
pub fn canonicalize(mut points: Vec<CanonicalPoint>) -> Vec<CanonicalPoint> {
    points.sort_by_key(|point| point.time);

    let mut out: Vec<CanonicalPoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.time == point.time => *last = point,
            _ => out.push(point),
        }
    }
    out
}

/// Classify a normalization result: no series or only empty series is an
/// empty dataset
pub fn ensure_not_empty(series: &[Series]) -> Result<(), NormalizeError> {
    if series.iter().all(Series::is_empty) {
        Err(NormalizeError::EmptyDataset)
    } else {
        Ok(())
    }
}

struct SeriesMeta<'a> {
    id: &'a str,
    name: &'a str,
    color: &'a str,
    kind: SignalKind,
    resolution: SampleResolution,
    unit: Option<String>,
    y_axis_range: Option<(f64, f64)>,
}

fn build_series(meta: SeriesMeta<'_>, raw_count: usize, points: Vec<CanonicalPoint>) -> Series {
    let dropped_points = raw_count - points.len();
    if dropped_points > 0 {
        tracing::debug!(
            "Channel {} ({}): dropped {} of {} points",
            meta.id,
            meta.kind,
            dropped_points,
            raw_count
        );
    }

    let points = canonicalize(points);
    let current_value = points.last().and_then(CanonicalPoint::primary);

    Series {
        id: meta.id.to_string(),
        name: meta.name.to_string(),
        color: meta.color.to_string(),
        kind: meta.kind,
        resolution: meta.resolution,
        unit: meta.unit,
        y_axis_range: meta.y_axis_range,
        points,
        current_value,
        dropped_points,
    }
}

// ============================================================================
// Series Cache
// ============================================================================

/// Holds the canonical series of exactly one (vehicle, date) selection.
///
/// Entries are replaced wholesale; there is no partial invalidation.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entry: Option<(CacheKey, Arc<[Series]>)>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached series for `key`, if that is the selection held
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[Series]>> {
        match &self.entry {
            Some((cached, series)) if cached == key => Some(Arc::clone(series)),
            _ => None,
        }
    }

    /// Key of the selection currently held
    pub fn key(&self) -> Option<&CacheKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    /// Replace the cached entry
    pub fn publish(&mut self, key: CacheKey, series: Arc<[Series]>) {
        self.entry = Some((key, series));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Return the cached series for `key`, normalizing and replacing the
    /// entry when the key differs from the one held
    pub fn get_or_normalize<F>(&mut self, key: &CacheKey, normalize_fn: F) -> Arc<[Series]>
    where
        F: FnOnce() -> Vec<Series>,
    {
        if let Some(series) = self.get(key) {
            return series;
        }

        let series: Arc<[Series]> = normalize_fn().into();
        self.publish(key.clone(), Arc::clone(&series));
        series
    }
}
