//! Controller configuration: TOML loading, validation, persistence.
//!
//! The controller loads one TOML file at startup. A missing or malformed
//! file is reported and replaced by built-in defaults; startup never
//! fails on configuration. Drive offsets accumulated during operation are
//! written back to the same file at shutdown (hardware mode only).

use crate::consts::{
    DEFAULT_LOWER_POSITION_LIMIT, DEFAULT_UPPER_POSITION_LIMIT, DEFAULT_VELOCITY_LIMIT, NUM_AXES,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// Configuration file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn default_velocity_limit() -> f64 {
    DEFAULT_VELOCITY_LIMIT
}

fn default_lower_position_limit() -> f64 {
    DEFAULT_LOWER_POSITION_LIMIT
}

fn default_upper_position_limit() -> f64 {
    DEFAULT_UPPER_POSITION_LIMIT
}

fn default_true() -> bool {
    true
}

/// Per-axis configuration, immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Velocity limit [rad/s]. Commands outside ±limit are dropped.
    #[serde(default = "default_velocity_limit")]
    pub velocity_limit: f64,

    /// Lower position limit [rad].
    #[serde(default = "default_lower_position_limit")]
    pub lower_position_limit: f64,

    /// Upper position limit [rad].
    #[serde(default = "default_upper_position_limit")]
    pub upper_position_limit: f64,

    /// Initial position [rad]. Simulation only; hardware axes report the
    /// encoder position.
    #[serde(default)]
    pub initial_position: f64,

    /// Drive offset [rad/s] nulling out steady-state actuator bias.
    /// Accumulates via `add_drive_offset` and is persisted at shutdown.
    #[serde(default)]
    pub drive_offset: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            velocity_limit: DEFAULT_VELOCITY_LIMIT,
            lower_position_limit: DEFAULT_LOWER_POSITION_LIMIT,
            upper_position_limit: DEFAULT_UPPER_POSITION_LIMIT,
            initial_position: 0.0,
            drive_offset: 0.0,
        }
    }
}

impl AxisConfig {
    /// Validate a single axis entry.
    pub fn validate(&self, axis: usize) -> Result<(), ConfigError> {
        if !self.velocity_limit.is_finite() || self.velocity_limit < 0.0 {
            return Err(ConfigError::Validation(format!(
                "axis {axis}: velocity_limit must be finite and >= 0 (got {})",
                self.velocity_limit
            )));
        }
        if self.lower_position_limit > self.upper_position_limit {
            return Err(ConfigError::Validation(format!(
                "axis {axis}: lower_position_limit ({}) must be <= upper_position_limit ({})",
                self.lower_position_limit, self.upper_position_limit
            )));
        }
        Ok(())
    }
}

/// Controller configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// True if the simulated axis backends should be used.
    #[serde(default = "default_true")]
    pub simulation: bool,

    /// Per-axis entries. Missing entries are padded with defaults up to
    /// [`NUM_AXES`]; more than [`NUM_AXES`] entries is a validation error.
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            simulation: true,
            axes: vec![AxisConfig::default(); NUM_AXES],
        }
    }
}

impl ControllerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.axes.len() > NUM_AXES {
            return Err(ConfigError::Validation(format!(
                "too many axes: {} (max {NUM_AXES})",
                self.axes.len()
            )));
        }
        for (i, axis) in self.axes.iter().enumerate() {
            axis.validate(i)?;
        }
        Ok(())
    }

    /// Pad the axis list with defaults so exactly [`NUM_AXES`] entries
    /// exist. Reports padding so a short file is visible in the log.
    pub fn normalize(&mut self) {
        if self.axes.len() < NUM_AXES {
            warn!(
                configured = self.axes.len(),
                expected = NUM_AXES,
                "axis list is short, padding with defaults"
            );
            self.axes.resize(NUM_AXES, AxisConfig::default());
        }
    }
}

/// Load and validate a controller configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: ControllerConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    config.normalize();
    Ok(config)
}

/// Load a configuration, falling back to built-in defaults on any error.
///
/// Configuration trouble is reported, never fatal: the controller starts
/// with defaults and the operator fixes the file.
pub fn load_config_or_default(path: &Path) -> ControllerConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config load failed, using defaults");
            ControllerConfig::default()
        }
    }
}

/// Write the configuration back to a TOML file.
///
/// Used at shutdown to persist accumulated drive offsets.
pub fn save_config(path: &Path, config: &ControllerConfig) -> Result<(), ConfigError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.simulation);
        assert_eq!(config.axes.len(), NUM_AXES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn axis_defaults() {
        let axis = AxisConfig::default();
        assert_eq!(axis.velocity_limit, DEFAULT_VELOCITY_LIMIT);
        assert_eq!(axis.initial_position, 0.0);
        assert_eq!(axis.drive_offset, 0.0);
        assert!(axis.lower_position_limit < axis.upper_position_limit);
    }

    #[test]
    fn validate_rejects_inverted_position_limits() {
        let axis = AxisConfig {
            lower_position_limit: 1.0,
            upper_position_limit: -1.0,
            ..AxisConfig::default()
        };
        assert!(axis.validate(0).is_err());
    }

    #[test]
    fn validate_rejects_negative_velocity_limit() {
        let axis = AxisConfig {
            velocity_limit: -0.5,
            ..AxisConfig::default()
        };
        assert!(axis.validate(0).is_err());
    }

    #[test]
    fn validate_rejects_too_many_axes() {
        let config = ControllerConfig {
            simulation: true,
            axes: vec![AxisConfig::default(); NUM_AXES + 1],
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too many axes"));
    }

    #[test]
    fn normalize_pads_short_axis_list() {
        let mut config = ControllerConfig {
            simulation: true,
            axes: vec![AxisConfig::default(); 2],
        };
        config.normalize();
        assert_eq!(config.axes.len(), NUM_AXES);
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let mut config: ControllerConfig = toml::from_str(
            r#"
simulation = false

[[axes]]
velocity_limit = 0.8
lower_position_limit = -2.0
upper_position_limit = 2.0
"#,
        )
        .unwrap();
        assert!(!config.simulation);
        assert_eq!(config.axes.len(), 1);
        assert_eq!(config.axes[0].velocity_limit, 0.8);
        assert_eq!(config.axes[0].drive_offset, 0.0);
        config.normalize();
        assert_eq!(config.axes.len(), NUM_AXES);
    }
}
