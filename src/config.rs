//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the tide location and its civil timezone,
//! where the tide table comes from, and how the board is displayed.

use crate::{civil_time, tide_data::TideError, HIGH_TIDE_THRESHOLD_M};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Tide location and its civil timezone
    pub location: LocationConfig,
    /// Tide table source and cache
    pub data: DataConfig,
    /// Display and UI configuration
    pub display: DisplayConfig,
}

/// Tide location configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Human-readable location name
    pub name: String,
    /// IANA timezone name all tide timestamps are interpreted in
    pub timezone: String,
}

/// Tide table source configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct DataConfig {
    /// Local path or http(s) URL of the tides JSON file
    pub source: String,
    /// Where the last good copy of the source is kept
    pub cache_path: String,
    /// Cache TTL in minutes
    pub cache_ttl_minutes: u64,
}

/// Display and visualization configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Heights at or above this are shown as high tide
    pub high_tide_threshold_m: f64,
    /// Seconds between re-renders in watch mode
    pub refresh_seconds: u64,
    /// Height of the ASCII chart in rows
    pub chart_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                name: "João Pessoa".to_string(),
                timezone: "America/Recife".to_string(),
            },
            data: DataConfig {
                source: "tides.json".to_string(),
                cache_path: "/tmp/tide_board_cache.json".to_string(),
                cache_ttl_minutes: 720,
            },
            display: DisplayConfig {
                high_tide_threshold_m: HIGH_TIDE_THRESHOLD_M,
                refresh_seconds: 60,
                chart_rows: 16,
            },
        }
    }
}

impl Config {
    /// Load configuration from tide-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(location = %config.location.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {e}");
                    warn!("using default configuration (João Pessoa)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    path = %path.as_ref().display(),
                    "no config file found, using default configuration (João Pessoa)"
                );
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Resolve the configured timezone name
    pub fn timezone(&self) -> Result<Tz, TideError> {
        civil_time::parse_zone(&self.location.timezone)
            .ok_or_else(|| TideError::Timezone(self.location.timezone.clone()))
    }
}
