// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{Facing, VirtualCameraSettings};
use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, CONFIG_VERSION, SECOND_CAPTURE_DELAY_MS,
    VIRTUAL_CAPTURE_LATENCY_MS, VIRTUAL_WARMUP_MS,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version of the stored file
    pub version: u32,
    /// Camera bound to the primary view at mount
    pub initial_facing: Facing,
    /// Delay before the second capture is taken, in milliseconds
    pub second_capture_delay_ms: u64,
    /// Also wait for the secondary stream's ready signal (delay becomes a floor)
    pub wait_for_secondary_ready: bool,
    /// Send usage events to the telemetry sink
    pub telemetry_enabled: bool,
    /// Simulated stream start-up time, in milliseconds
    pub virtual_warmup_ms: u64,
    /// Simulated capture time, in milliseconds
    pub virtual_capture_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            initial_facing: Facing::Back,
            second_capture_delay_ms: SECOND_CAPTURE_DELAY_MS,
            wait_for_secondary_ready: false,
            telemetry_enabled: true,
            virtual_warmup_ms: VIRTUAL_WARMUP_MS,
            virtual_capture_latency_ms: VIRTUAL_CAPTURE_LATENCY_MS,
        }
    }
}

impl Config {
    /// Default location: `<config dir>/dual-camera/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or unreadable file yields defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, reporting any error
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        if config.version > CONFIG_VERSION {
            return Err(AppError::Config(format!(
                "config version {} is newer than supported version {}",
                config.version, CONFIG_VERSION
            )));
        }
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Write to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".into()))?;
        self.save_to(&path)
    }

    pub fn second_capture_delay(&self) -> Duration {
        Duration::from_millis(self.second_capture_delay_ms)
    }

    /// Settings for the simulated camera
    pub fn virtual_camera(&self) -> VirtualCameraSettings {
        VirtualCameraSettings {
            warmup: Duration::from_millis(self.virtual_warmup_ms),
            capture_latency: Duration::from_millis(self.virtual_capture_latency_ms),
            ..VirtualCameraSettings::default()
        }
    }
}
