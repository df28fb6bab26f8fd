//! FleetLog - A vehicle telemetry day viewer written in Rust
//!
//! This library turns one vehicle's day of telemetry (digital inputs,
//! analog sensors with min/max envelopes, GPS) into time-aligned series and
//! drives the range scrubber that keeps every chart on the same time window.
//!
//! ## Module Structure
//!
//! - [`adapters`] - Telemetry sources (HTTP API, local files)
//! - [`app`] - Main application state and eframe::App implementation
//! - [`parsers`] - Payload decoding into canonical raw types
//! - [`time_align`] - Timestamp parsing and grid alignment
//! - [`units`] - Channel unit transforms and GPS coordinate decoding
//! - [`normalize`] - Canonical series construction and the series cache
//! - [`downsample`] - LTTB point reduction
//! - [`window`] - Visible-window extraction
//! - [`domain`] - Shared chart time domain
//! - [`scrubber`] - Range scrubber state machine and ticks
//! - [`dashboard`] - Load orchestration and chart data
//! - [`settings`] - User settings persistence
//! - [`state`] - Core data types and constants
//! - [`ui`] - User interface components
//!   - `side_panel` - Vehicle, date and view options
//!   - `chart` - Synchronized chart rendering and legends
//!   - `scrubber` - Custom-painted range scrubber
//!   - `toast` - Toast notification system

pub mod adapters;
pub mod app;
pub mod dashboard;
pub mod domain;
pub mod downsample;
pub mod normalize;
pub mod parsers;
pub mod scrubber;
pub mod settings;
pub mod state;
pub mod time_align;
pub mod ui;
pub mod units;
pub mod window;
