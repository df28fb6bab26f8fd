//! Local payload files, as written by the backend's cache generator.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{SourceError, TelemetrySource};
use crate::state::CacheKey;

#[derive(Debug, Clone)]
enum Location {
    /// Directory holding `{vehicle}_{date}.json` files
    Directory(PathBuf),
    /// A single payload file, returned for every selection
    File(PathBuf),
}

/// Reads payloads from disk
#[derive(Debug, Clone)]
pub struct FileSource {
    location: Location,
}

impl FileSource {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Directory(dir.into()),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// File name used for a selection inside a data directory
    pub fn file_name(key: &CacheKey) -> String {
        format!("{}_{}.json", sanitize(&key.vehicle_id), key.date.format("%Y-%m-%d"))
    }

    /// Vehicle and day encoded in a `{vehicle}_{date}.json` file name
    pub fn selection_from_path(path: &Path) -> Option<(String, NaiveDate)> {
        let stem = path
            .extension()
            .filter(|ext| ext.eq_ignore_ascii_case("json"))
            .and(path.file_stem())?
            .to_str()?;
        let (vehicle, date) = stem.rsplit_once('_')?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        (!vehicle.is_empty()).then(|| (vehicle.to_string(), date))
    }

    /// Path that would be read for `key`
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        match &self.location {
            Location::Directory(dir) => dir.join(Self::file_name(key)),
            Location::File(path) => path.clone(),
        }
    }
}

/// Keep vehicle identifiers from escaping the data directory
fn sanitize(vehicle_id: &str) -> String {
    vehicle_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
        _ => SourceError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

impl TelemetrySource for FileSource {
    fn fetch(&self, key: &CacheKey) -> Result<String, SourceError> {
        let path = self.path_for(key);
        tracing::debug!("Reading telemetry from {}", path.display());
        read(&path)
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::Directory(dir) => dir.display().to_string(),
            Location::File(path) => path.display().to_string(),
        }
    }
}
