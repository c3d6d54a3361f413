//! TOML fault-point manifest loading.
//!
//! A manifest declares the fault points a system registers at startup, so
//! that fault codes, thresholds and state machine bindings live in
//! configuration instead of code.
//!
//! # TOML Example
//!
//! ```toml
//! [[fault]]
//! index = 0
//! code = 0x1001
//! name = "temp_sensor"
//! threshold = 1
//!
//! [[fault]]
//! index = 2
//! code = 0x2001
//! name = "comm_timeout"
//! threshold = 3
//! bind_hsm = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_FAULT_POINTS;

/// Error type for manifest loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Manifest file not found at the given path.
    #[error("fault manifest not found: {0}")]
    NotFound(String),

    /// TOML parsing or file read failed.
    #[error("failed to parse fault manifest: {0}")]
    Parse(String),

    /// Semantic validation failed.
    #[error("fault manifest validation failed: {0}")]
    Validation(String),
}

/// One declared fault point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultPointConfig {
    /// Table index (0-based, dense).
    pub index: u16,
    /// User-assigned classification code.
    pub code: u32,
    /// Human-readable name, used in logs only.
    #[serde(default)]
    pub name: String,
    /// Raw attribute word (see `FaultAttr`).
    #[serde(default)]
    pub attr: u32,
    /// Occurrences required to confirm the fault.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Bind a per-fault state machine to this index.
    #[serde(default)]
    pub bind_hsm: bool,
    /// Confirmation threshold for the bound state machine; defaults to
    /// `threshold` when unset.
    #[serde(default)]
    pub hsm_threshold: Option<u32>,
}

fn default_threshold() -> u32 {
    1
}

/// Fault-point manifest: the set of points to register at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FccuConfig {
    #[serde(default, rename = "fault")]
    pub faults: Vec<FaultPointConfig>,
}

impl FccuConfig {
    /// Load and validate a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation: indices in range and unique, thresholds positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = [false; MAX_FAULT_POINTS];
        for point in &self.faults {
            let index = point.index as usize;
            if index >= MAX_FAULT_POINTS {
                return Err(ConfigError::Validation(format!(
                    "fault index {} exceeds the {}-point limit",
                    point.index, MAX_FAULT_POINTS
                )));
            }
            if seen[index] {
                return Err(ConfigError::Validation(format!(
                    "duplicate fault index {}",
                    point.index
                )));
            }
            seen[index] = true;
            if point.threshold == 0 {
                return Err(ConfigError::Validation(format!(
                    "fault {}: threshold must be >= 1",
                    point.index
                )));
            }
            if point.hsm_threshold == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "fault {}: hsm_threshold must be >= 1",
                    point.index
                )));
            }
        }
        Ok(())
    }
}
