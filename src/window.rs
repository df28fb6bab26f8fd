//! Visible-window extraction.
//!
//! Charts never receive a full day of per-second points: each series is cut
//! to the visible domain (plus padding so lines run off the plot edges
//! instead of stopping short) and reduced only when it is still too dense.

use crate::downsample::reduce;
use crate::state::{CanonicalPoint, Padding, Series, TimeDomain};

/// Points of `points` whose time lies inside `range`, found by binary search
pub fn slice_range<'a>(points: &'a [CanonicalPoint], range: &TimeDomain) -> &'a [CanonicalPoint] {
    let start = points.partition_point(|p| p.time < range.start);
    let end = points.partition_point(|p| p.time <= range.end);
    &points[start..end.max(start)]
}

/// Cut a series to the padded visible domain and enforce the point budget.
///
/// With `budget` of `None` every point inside the padded range is kept.
/// The output stays time-ascending without duplicates since both steps only
/// select from the canonical input.
pub fn extract_window(
    series: &Series,
    domain: &TimeDomain,
    padding: Padding,
    budget: Option<usize>,
) -> Series {
    let padded = padding.apply(domain);
    let visible = slice_range(&series.points, &padded);

    let points = match budget {
        Some(target) if visible.len() > target => reduce(series.kind, visible, target),
        _ => visible.to_vec(),
    };

    series.with_points(points)
}
