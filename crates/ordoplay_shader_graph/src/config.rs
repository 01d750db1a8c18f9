// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph settings.
//!
//! Settings are stored as RON. Every field has a default so settings files
//! written by older versions keep loading.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default length of baked curve sample tables
pub const DEFAULT_CURVE_TABLE_SIZE: usize = 256;

/// Default number of steps used to sample cubic Hermite curves
pub const DEFAULT_CURVE_SEGMENTS: usize = 64;

/// Parameters of a flattening pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenConfig {
    /// Number of samples in every baked curve table
    pub curve_table_size: usize,
    /// Number of steps used to sample cubic Hermite curves
    pub curve_segments: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            curve_table_size: DEFAULT_CURVE_TABLE_SIZE,
            curve_segments: DEFAULT_CURVE_SEGMENTS,
        }
    }
}

/// Settings file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Settings format version
    pub version: u32,
    /// Flattening parameters
    pub flatten: FlattenConfig,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            flatten: FlattenConfig::default(),
        }
    }
}

impl GraphSettings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let settings: GraphSettings = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render settings as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::debug!("Loaded graph settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version > SETTINGS_FORMAT_VERSION {
            return Err(ConfigError::Invalid(format!(
                "settings version {} is newer than supported version {}",
                self.version, SETTINGS_FORMAT_VERSION
            )));
        }
        if self.flatten.curve_table_size == 0 {
            return Err(ConfigError::Invalid("curve_table_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text is not valid settings RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be rendered
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// Settings parsed but are not usable
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
