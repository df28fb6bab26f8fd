//! User settings persistence.
//!
//! This module handles loading and saving user preferences across sessions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter};
use thiserror::Error;

use crate::adapters::{FileSource, HttpSource, TelemetrySource};
use crate::dashboard::DashboardConfig;
use crate::state::{Padding, ViewMode, DEFAULT_ANALOG_CHUNK_SIZE};
use crate::units::CoordinateConvention;

/// Current settings file version
const SETTINGS_VERSION: u32 = 1;

/// API base URL used until the user configures one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write settings file: {0}")]
    Write(std::io::Error),
}

/// Where telemetry payloads are fetched from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum SourceKind {
    #[default]
    #[strum(serialize = "Telemetry API")]
    Api,
    #[strum(serialize = "Local files")]
    Files,
}

/// User settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory of `{vehicle}_{date}.json` payload files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Vehicle selected when the app was last closed
    #[serde(default)]
    pub last_vehicle: String,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub padding: Padding,
    /// Hemispheres assumed for unsigned packed GPS coordinates
    #[serde(default)]
    pub coordinate_convention: CoordinateConvention,
    /// Offset of the fleet's local day from UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_chunk_size")]
    pub analog_chunk_size: usize,
    #[serde(default)]
    pub colorblind_mode: bool,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_ANALOG_CHUNK_SIZE
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            source: SourceKind::default(),
            api_base_url: default_api_base_url(),
            data_dir: None,
            last_vehicle: String::new(),
            view_mode: ViewMode::default(),
            padding: Padding::default(),
            coordinate_convention: CoordinateConvention::default(),
            utc_offset_minutes: 0,
            analog_chunk_size: DEFAULT_ANALOG_CHUNK_SIZE,
            colorblind_mode: false,
        }
    }
}

impl UserSettings {
    /// Get the config directory path for FleetLog
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("FleetLog"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|p| p.join("FleetLog"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::config_dir().map(|p| p.join("fleetlog"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk
    pub fn load() -> Self {
        match Self::get_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a specific file, falling back to defaults when it
    /// is missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::get_settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SettingsError::CreateDir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(SettingsError::Write)?;

        Ok(())
    }

    /// Dashboard configuration derived from these settings
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            view_mode: self.view_mode,
            padding: self.padding,
            convention: self.coordinate_convention,
            utc_offset_minutes: self.utc_offset_minutes,
            analog_chunk_size: self.analog_chunk_size.max(1),
        }
    }

    /// Telemetry source selected by these settings. Local files fall back to
    /// the working directory when no data directory is configured.
    pub fn telemetry_source(&self) -> Box<dyn TelemetrySource> {
        match self.source {
            SourceKind::Api => Box::new(HttpSource::new(self.api_base_url.clone())),
            SourceKind::Files => {
                let dir = self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
                Box::new(FileSource::directory(dir))
            }
        }
    }
}
