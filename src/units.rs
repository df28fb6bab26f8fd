//! Channel unit transforms and GPS coordinate decoding.
//!
//! Devices report raw counts; each analog channel carries a linear
//! `resolution`/`offset` pair that turns them into engineering units. GPS
//! receivers on some units report NMEA-style packed degree-minutes
//! (`DDDMM.MMMM`) without a hemisphere letter, so the sign has to come from a
//! per-deployment convention.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Largest valid absolute latitude in decimal degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest valid absolute longitude in decimal degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// Linear channel transform: `value * resolution + offset`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub resolution: f64,
    pub offset: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        resolution: 1.0,
        offset: 0.0,
    };

    pub fn new(resolution: f64, offset: f64) -> Self {
        Self { resolution, offset }
    }

    #[inline]
    pub fn apply(&self, raw: Option<f64>) -> Option<f64> {
        transform(raw, self.resolution, self.offset)
    }
}

/// Apply `raw * resolution + offset`.
///
/// Returns `None` when there is no sample or it is not finite. Zero and
/// negative samples are real readings and pass through the transform.
#[inline]
pub fn transform(raw: Option<f64>, resolution: f64, offset: f64) -> Option<f64> {
    let raw = raw.filter(|v| v.is_finite())?;
    Some(raw * resolution + offset).filter(|v| v.is_finite())
}

// ============================================================================
// Coordinates
// ============================================================================

/// Which coordinate a value belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn limit(&self) -> f64 {
        match self {
            Axis::Latitude => MAX_LATITUDE,
            Axis::Longitude => MAX_LONGITUDE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }
}

/// Hemisphere assumed for unsigned packed latitudes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum LatitudeHemisphere {
    North,
    #[default]
    South,
}

/// Hemisphere assumed for unsigned packed longitudes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum LongitudeHemisphere {
    #[default]
    East,
    West,
}

/// Sign convention for packed coordinates that arrive without a sign.
///
/// The fleet this was written for runs in the southern/eastern hemisphere.
/// Other deployments must set this from the device configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateConvention {
    pub latitude: LatitudeHemisphere,
    pub longitude: LongitudeHemisphere,
}

impl CoordinateConvention {
    fn sign(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Latitude => match self.latitude {
                LatitudeHemisphere::North => 1.0,
                LatitudeHemisphere::South => -1.0,
            },
            Axis::Longitude => match self.longitude {
                LongitudeHemisphere::East => 1.0,
                LongitudeHemisphere::West => -1.0,
            },
        }
    }
}

/// Decode a coordinate into decimal degrees.
///
/// Values already inside the axis range are decimal degrees and are returned
/// unchanged. Larger magnitudes are packed `DDDMM.MMMM`: degrees are the
/// integer quotient by 100 and minutes the remainder. Results outside the
/// axis range, minutes of 60 or more, and non-finite input yield `None`.
pub fn decode_coordinate(value: f64, axis: Axis, convention: &CoordinateConvention) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }

    let limit = axis.limit();
    if value.abs() <= limit {
        return Some(value);
    }

    let magnitude = value.abs();
    let degrees = (magnitude / 100.0).trunc();
    let minutes = magnitude - degrees * 100.0;
    if minutes >= 60.0 {
        return None;
    }

    let decoded = degrees + minutes / 60.0;
    if decoded > limit {
        return None;
    }

    let sign = if value < 0.0 {
        -1.0
    } else {
        convention.sign(axis)
    };
    Some(sign * decoded)
}
