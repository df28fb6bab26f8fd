//! Shared X domain for every chart.

use crate::state::{SelectionRange, Series, TimeDomain};

/// Union of the first and last timestamps of every non-empty series
pub fn data_extent(series: &[Series]) -> Option<TimeDomain> {
    series
        .iter()
        .filter_map(Series::extent)
        .reduce(|acc, extent| acc.union(&extent))
}

/// The domain every chart shares.
///
/// An explicit selection wins; otherwise the union of all loaded series.
/// `None` when nothing is loaded. Always derived, never stored.
pub fn compute_domain(selection: Option<&SelectionRange>, series: &[Series]) -> Option<TimeDomain> {
    match selection {
        Some(range) => Some(range.as_domain()),
        None => data_extent(series),
    }
}
