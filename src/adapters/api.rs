//! HTTP client for the telemetry charts endpoint.

use super::{SourceError, TelemetrySource};
use crate::state::CacheKey;

/// Path of the charts endpoint below the API base URL
const CHARTS_PATH: &str = "/api/charts";

/// User agent for API requests
const USER_AGENT: &str = concat!("FleetLog/", env!("CARGO_PKG_VERSION"));

/// Fetches payloads with `GET {base_url}/api/charts?vehicle=..&date=..`
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL without the query string
    pub fn charts_url(&self) -> String {
        format!("{}{}", self.base_url, CHARTS_PATH)
    }
}

impl TelemetrySource for HttpSource {
    fn fetch(&self, key: &CacheKey) -> Result<String, SourceError> {
        let url = self.charts_url();
        let date = key.date.format("%Y-%m-%d").to_string();
        tracing::debug!("GET {} vehicle={} date={}", url, key.vehicle_id, date);

        let mut response = ureq::get(&url)
            .query("vehicle", &key.vehicle_id)
            .query("date", &date)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => SourceError::Api {
                    status,
                    message: format!("HTTP {}", status),
                },
                _ => SourceError::Network(e.to_string()),
            })?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| SourceError::Body(e.to_string()))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
