//! Point reduction for rendering.
//!
//! Uses the LTTB (Largest Triangle Three Buckets) algorithm, which keeps the
//! visual shape of a series (peaks, troughs, edges) while bounding the number
//! of points handed to the plot.

use crate::state::{AnalogSample, CanonicalPoint, PointValue, SignalKind};

/// Indices selected by LTTB over `(xs, ys)`.
///
/// Returns every index when `xs.len() <= target`. Below three target points
/// only the endpoints are kept. The first and last index are always present
/// and the result is strictly ascending.
pub fn lttb_indices(xs: &[f64], ys: &[f64], target: usize) -> Vec<usize> {
    let n = xs.len().min(ys.len());

    if n <= target {
        return (0..n).collect();
    }
    if target < 3 {
        return if n == 1 { vec![0] } else { vec![0, n - 1] };
    }

    let mut result = Vec::with_capacity(target);
    result.push(0);

    // Interior points are split into target - 2 buckets
    let every = (n - 2) as f64 / (target - 2) as f64;
    let mut a = 0usize;

    for i in 0..(target - 2) {
        let bucket_start = (i as f64 * every).floor() as usize + 1;
        let bucket_end = (((i + 1) as f64 * every).floor() as usize + 1).min(n - 1);

        // Average of the next bucket is the third triangle vertex
        let next_start = bucket_end;
        let next_end = (((i + 2) as f64 * every).floor() as usize + 1).min(n);
        let (avg_x, avg_y) = if next_start < next_end {
            let count = (next_end - next_start) as f64;
            let sum_x: f64 = xs[next_start..next_end].iter().sum();
            let sum_y: f64 = ys[next_start..next_end].iter().sum();
            (sum_x / count, sum_y / count)
        } else {
            (xs[n - 1], ys[n - 1])
        };

        let (a_x, a_y) = (xs[a], ys[a]);
        let mut max_area = -1.0f64;
        let mut max_index = bucket_start;

        for j in bucket_start..bucket_end.max(bucket_start + 1) {
            let area = ((a_x - avg_x) * (ys[j] - a_y) - (a_x - xs[j]) * (avg_y - a_y)).abs();
            if area > max_area {
                max_area = area;
                max_index = j;
            }
        }

        result.push(max_index);
        a = max_index;
    }

    result.push(n - 1);
    result
}

fn time_axis(points: &[CanonicalPoint]) -> Vec<f64> {
    points.iter().map(|p| p.time as f64).collect()
}

/// Reduce a series to at most `target` points using its primary value.
///
/// The input is returned unchanged when it already fits.
pub fn downsample(points: &[CanonicalPoint], target: usize) -> Vec<CanonicalPoint> {
    if points.len() <= target {
        return points.to_vec();
    }

    let xs = time_axis(points);
    let ys: Vec<f64> = points.iter().map(|p| p.primary().unwrap_or(0.0)).collect();

    lttb_indices(&xs, &ys, target)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Per-track budget for the three analog tracks, chosen so the union of the
/// tracks (which share their endpoints) never exceeds `target`
fn track_budget(target: usize) -> usize {
    (target - 2) / 3 + 2
}

/// Reduce analog envelope points, preserving extrema of every track.
///
/// Average, minimum and maximum are reduced independently and the chosen
/// timestamps are merged. Every emitted point carries all three fields: a
/// missing average is taken from the envelope center and a missing bound
/// from the average.
pub fn downsample_analog(points: &[CanonicalPoint], target: usize) -> Vec<CanonicalPoint> {
    if points.len() <= target {
        return points.iter().map(complete_envelope).collect();
    }

    // Too small a budget to split across three tracks
    if target < 5 {
        return downsample(points, target)
            .iter()
            .map(complete_envelope)
            .collect();
    }

    let xs = time_axis(points);
    let samples: Vec<AnalogSample> = points
        .iter()
        .map(|p| p.analog_sample().unwrap_or_default())
        .collect();

    let center = |s: &AnalogSample| s.center().unwrap_or(0.0);
    let avg_track: Vec<f64> = samples.iter().map(center).collect();
    let min_track: Vec<f64> = samples.iter().map(|s| s.min.unwrap_or_else(|| center(s))).collect();
    let max_track: Vec<f64> = samples.iter().map(|s| s.max.unwrap_or_else(|| center(s))).collect();

    let budget = track_budget(target);
    let mut chosen: Vec<usize> = [avg_track, min_track, max_track]
        .iter()
        .flat_map(|track| lttb_indices(&xs, track, budget))
        .collect();
    chosen.sort_unstable();
    chosen.dedup();

    chosen
        .into_iter()
        .map(|i| complete_envelope(&points[i]))
        .collect()
}

/// Fill in missing analog fields; other point kinds pass through
fn complete_envelope(point: &CanonicalPoint) -> CanonicalPoint {
    let PointValue::Analog(sample) = point.value else {
        return *point;
    };
    let avg = sample.center();
    CanonicalPoint::analog(
        point.time,
        avg,
        sample.min.or(avg),
        sample.max.or(avg),
    )
}

/// Reduce points of a series of the given kind to at most `target`
pub fn reduce(kind: SignalKind, points: &[CanonicalPoint], target: usize) -> Vec<CanonicalPoint> {
    match kind {
        SignalKind::Analog => downsample_analog(points, target),
        SignalKind::Digital | SignalKind::Gps => downsample(points, target),
    }
}
