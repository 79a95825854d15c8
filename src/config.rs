//! File-backed analysis settings.
//!
//! Loaded from JSON; every field is optional and falls back to the defaults
//! the reservation dashboard ships with.

use crate::capacity::CapacityPolicy;
use crate::error::ConfigError;
use crate::slots::HoursWindow;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Operating hours shown on the slot grid
    pub hours: HoursSettings,

    /// Per-location capacity caps
    pub capacity: CapacityPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoursSettings {
    pub start: u8,
    pub end: u8,
}

impl Default for HoursSettings {
    fn default() -> Self {
        Self { start: 6, end: 22 }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Validated window; invalid hours are reported here, before any analysis.
    pub fn window(&self) -> Result<HoursWindow, ConfigError> {
        HoursWindow::new(self.hours.start, self.hours.end)
    }
}
