//! Telemetry sources.
//!
//! The dashboard never talks to the network or the disk itself. A
//! [`TelemetrySource`] returns the raw JSON for one (vehicle, date)
//! selection, which is then decoded by [`crate::parsers::JsonPayload`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleetlog::adapters::{HttpSource, TelemetrySource};
//!
//! let source = HttpSource::new("http://localhost:8000");
//! let body = source.fetch(&key)?;
//! ```

pub mod api;
pub mod file;

use std::path::PathBuf;

use thiserror::Error;

use crate::state::CacheKey;

pub use api::HttpSource;
pub use file::FileSource;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while fetching a telemetry payload
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network error during request
    #[error("Network error: {0}")]
    Network(String),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be read
    #[error("Failed to read response: {0}")]
    Body(String),

    /// No payload file for the selection
    #[error("No telemetry file at {}", .0.display())]
    NotFound(PathBuf),

    /// Payload file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can produce the raw telemetry JSON for a selection
pub trait TelemetrySource: Send + Sync {
    fn fetch(&self, key: &CacheKey) -> Result<String, SourceError>;

    /// Short human-readable description, for logs and the status bar
    fn describe(&self) -> String;
}
