//! UI rendering modules for the FleetLog application.
//!
//! Each submodule adds `impl FleetLogApp` blocks for one part of the window:
//!
//! - `side_panel` - Vehicle/day selection, load status, view and source options
//! - `chart` - Stacked, time-synchronized charts
//! - `scrubber` - Range scrubber and record indicator
//! - `toast` - Toast notification system

pub mod chart;
pub mod scrubber;
pub mod side_panel;
pub mod toast;
