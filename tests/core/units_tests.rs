//! Tests for channel transforms and coordinate decoding
//!
//! Tests cover:
//! - Linear resolution/offset transforms
//! - Missing and non-finite samples
//! - Decimal and packed GPS coordinates under both hemisphere conventions

use fleetlog::units::{
    decode_coordinate, transform, Axis, CoordinateConvention, LatitudeHemisphere,
    LongitudeHemisphere, Transform,
};

// ============================================
// Transform Tests
// ============================================

#[test]
fn test_resolution_and_offset() {
    assert_eq!(transform(Some(100.0), 0.5, -40.0), Some(10.0));
}

#[test]
fn test_negative_reading_is_kept() {
    assert_eq!(transform(Some(-5.0), 2.0, 0.0), Some(-10.0));
}

#[test]
fn test_zero_reading_is_not_missing() {
    assert_eq!(Transform::new(3.0, 1.5).apply(Some(0.0)), Some(1.5));
}

#[test]
fn test_missing_reading_stays_missing() {
    assert_eq!(Transform::new(3.0, 1.5).apply(None), None);
}

#[test]
fn test_default_transform_is_identity() {
    assert_eq!(Transform::default(), Transform::IDENTITY);
    assert_eq!(Transform::default().apply(Some(7.25)), Some(7.25));
}

// ============================================
// Coordinate Tests
// ============================================

#[test]
fn test_decimal_degrees_unchanged() {
    let convention = CoordinateConvention::default();
    assert_eq!(decode_coordinate(-33.8688, Axis::Latitude, &convention), Some(-33.8688));
    assert_eq!(decode_coordinate(151.2093, Axis::Longitude, &convention), Some(151.2093));
}

#[test]
fn test_packed_coordinates_default_convention() {
    let convention = CoordinateConvention::default();
    let lat = decode_coordinate(3352.128, Axis::Latitude, &convention).unwrap();
    let lng = decode_coordinate(15112.558, Axis::Longitude, &convention).unwrap();
    assert!((lat - (-33.8688)).abs() < 1e-4);
    assert!((lng - 151.2093).abs() < 1e-4);
}

#[test]
fn test_packed_coordinates_north_west() {
    let convention = CoordinateConvention {
        latitude: LatitudeHemisphere::North,
        longitude: LongitudeHemisphere::West,
    };
    let lat = decode_coordinate(4042.768, Axis::Latitude, &convention).unwrap();
    let lng = decode_coordinate(7400.36, Axis::Longitude, &convention).unwrap();
    assert!((lat - 40.7128).abs() < 1e-4);
    assert!((lng - (-74.006)).abs() < 1e-4);
}

#[test]
fn test_latitude_limits() {
    let convention = CoordinateConvention::default();
    assert_eq!(decode_coordinate(90.0, Axis::Latitude, &convention), Some(90.0));
    assert_eq!(decode_coordinate(9100.0, Axis::Latitude, &convention), None);
    assert_eq!(decode_coordinate(f64::NAN, Axis::Latitude, &convention), None);
}

#[test]
fn test_minutes_out_of_range() {
    let convention = CoordinateConvention::default();
    assert_eq!(decode_coordinate(15160.5, Axis::Longitude, &convention), None);
}

#[test]
fn test_convention_serializes_by_name() {
    let json = serde_json::to_string(&CoordinateConvention::default()).unwrap();
    assert!(json.contains("South"));
    assert!(json.contains("East"));
}
