use crate::core::{EstimationMode, DEFAULT_UPDATE_INTERVAL_MS, SCENE_LIMIT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Longest accepted update tick interval (milliseconds)
pub const MAX_UPDATE_INTERVAL_MS: u64 = 10_000;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether the current location comes from the provider alone or is fused
    /// with the tracking frame
    pub estimation_mode: EstimationMode,
    /// Trusted planar radius around the device (meters)
    pub scene_limit_m: f64,
    /// Estimate prune radius (meters); the scene limit when unset
    pub prune_radius_m: Option<f64>,
    /// Update tick interval (milliseconds)
    pub update_interval_ms: u64,
    /// Align the scene's -z axis with true north
    pub orient_to_true_north: bool,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("Config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            estimation_mode: EstimationMode::Fused,
            scene_limit_m: SCENE_LIMIT,
            prune_radius_m: None,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            orient_to_true_north: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: SessionConfig = serde_json::from_str(&content)?;
        config.validate()?;

        log::debug!("Loaded session config from '{}'", path.as_ref().display());
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn with_estimation_mode(mut self, mode: EstimationMode) -> Self {
        self.estimation_mode = mode;
        self
    }

    pub fn with_scene_limit(mut self, scene_limit_m: f64) -> Self {
        self.scene_limit_m = scene_limit_m;
        self
    }

    pub fn with_prune_radius(mut self, prune_radius_m: f64) -> Self {
        self.prune_radius_m = Some(prune_radius_m);
        self
    }

    pub fn with_update_interval(mut self, update_interval_ms: u64) -> Self {
        self.update_interval_ms = update_interval_ms;
        self
    }

    /// Radius used when pruning stale estimates
    pub fn prune_radius(&self) -> f64 {
        self.prune_radius_m.unwrap_or(self.scene_limit_m)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive_distance("scene_limit_m", self.scene_limit_m)?;

        if let Some(radius) = self.prune_radius_m {
            check_positive_distance("prune_radius_m", radius)?;
        }

        if self.update_interval_ms == 0 || self.update_interval_ms > MAX_UPDATE_INTERVAL_MS {
            return Err(ConfigError::InvalidParameter {
                parameter: "update_interval_ms".to_string(),
                value: self.update_interval_ms.to_string(),
                reason: format!("must be between 1 and {} ms", MAX_UPDATE_INTERVAL_MS),
            });
        }

        Ok(())
    }
}

fn check_positive_distance(parameter: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: "must be a positive distance in meters".to_string(),
        });
    }
    Ok(())
}
