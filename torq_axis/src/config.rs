//! TOML configuration loader with validation.
//!
//! Loads the board-level trip levels plus one block per axis
//! (hardware binding, behaviour config, endstop configs). Validation
//! covers parameter bounds, the trip band ordering, and pin
//! assignment conflicts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use torq_common::axis::config::{AxisConfig, AxisHardwareConfig, BoardConfig, EndstopConfig};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config validation: {0}")]
    Validation(String),
}

// ─── Config Structs ─────────────────────────────────────────────────

/// One axis block: hardware binding plus behaviour and endstops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxisNodeConfig {
    #[serde(default)]
    pub hw: AxisHardwareConfig,
    #[serde(default)]
    pub config: AxisConfig,
    #[serde(default)]
    pub min_endstop: EndstopConfig,
    #[serde(default)]
    pub max_endstop: EndstopConfig,
}

/// Complete validated drive configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub axes: Vec<AxisNodeConfig>,
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the drive configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DriveConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&text)
}

/// Load config from a TOML string (also used by tests).
pub fn load_config_from_str(text: &str) -> Result<DriveConfig, ConfigError> {
    let config: DriveConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

// ─── Validation ─────────────────────────────────────────────────────

fn validate(config: &DriveConfig) -> Result<(), ConfigError> {
    config.board.validate().map_err(ConfigError::Validation)?;

    for (i, node) in config.axes.iter().enumerate() {
        node.config
            .validate()
            .map_err(|e| ConfigError::Validation(format!("axis {i}: {e}")))?;

        if node.config.enable_step_dir && node.hw.step_pin == node.hw.dir_pin {
            return Err(ConfigError::Validation(format!(
                "axis {i}: step and dir share pin {}",
                node.hw.step_pin
            )));
        }
        if node.min_endstop.enabled
            && node.max_endstop.enabled
            && node.min_endstop.gpio_num == node.max_endstop.gpio_num
        {
            return Err(ConfigError::Validation(format!(
                "axis {i}: min and max endstops share pin {}",
                node.min_endstop.gpio_num
            )));
        }
    }

    Ok(())
}
