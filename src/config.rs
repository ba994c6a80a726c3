//! Solver settings
//!
//! Every constant of the two nested searches lives here so a project can
//! override it from a TOML file. The defaults reproduce the legacy
//! procedure.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::numeric::GUARD_EPSILON;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Parameters of the slip-angle search, the depth search and apportionment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// First trial slip angle θ (deg)
    pub theta_start_deg: f64,
    /// Initial θ step (deg)
    pub theta_step_deg: f64,
    /// The θ search stops once the step is at or below this (deg)
    pub theta_tolerance_deg: f64,
    /// θ is never evaluated at or above this bound (deg)
    pub theta_max_deg: f64,
    pub max_theta_iterations: usize,

    /// Seed pivot depth t (m)
    pub depth_start_m: f64,
    /// Seed depth step Δt (m). Positive; the first move goes deeper.
    ///
    /// The legacy listing never shows how this step was chosen, so it is a
    /// plain parameter rather than a derived value.
    pub depth_step_m: f64,
    /// The depth search stops once |Δt| is at or below this (m)
    pub depth_tolerance_m: f64,
    pub max_depth_iterations: usize,

    /// Denominators below this magnitude count as singular
    pub guard_epsilon: f64,
    /// Factor in Δt = k · (Eph − H) / σEph
    pub depth_correction_factor: f64,

    /// Remaining demand at or below this counts as fully apportioned
    pub apportionment_tolerance: f64,
    /// Flat allowance added to the required depth for the recommendation (m)
    pub recommended_allowance_m: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            theta_start_deg: 5.0,
            theta_step_deg: 5.0,
            theta_tolerance_deg: 0.1,
            theta_max_deg: 89.0,
            max_theta_iterations: 2000,
            depth_start_m: 3.0,
            depth_step_m: 1.0,
            depth_tolerance_m: 0.01,
            max_depth_iterations: 500,
            guard_epsilon: GUARD_EPSILON,
            depth_correction_factor: 0.54,
            apportionment_tolerance: 1e-12,
            recommended_allowance_m: 0.0,
        }
    }
}

impl SolverConfig {
    /// Parse settings from TOML; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Same settings with a different seed depth and step
    pub fn with_depth_seed(&self, start_m: f64, step_m: f64) -> Self {
        Self {
            depth_start_m: start_m,
            depth_step_m: step_m,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("theta_step_deg", self.theta_step_deg)?;
        positive("theta_tolerance_deg", self.theta_tolerance_deg)?;
        positive("depth_start_m", self.depth_start_m)?;
        positive("depth_step_m", self.depth_step_m)?;
        positive("depth_tolerance_m", self.depth_tolerance_m)?;
        positive("guard_epsilon", self.guard_epsilon)?;
        positive("apportionment_tolerance", self.apportionment_tolerance)?;

        if !(self.theta_start_deg.is_finite()
            && self.theta_start_deg > 0.0
            && self.theta_start_deg < self.theta_max_deg
            && self.theta_max_deg < 90.0)
        {
            return Err(ConfigError::InvalidSetting {
                field: "theta_start_deg",
                reason: format!(
                    "need 0 < start ({}) < bound ({}) < 90",
                    self.theta_start_deg, self.theta_max_deg
                ),
            });
        }
        if self.max_theta_iterations == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "max_theta_iterations",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_depth_iterations == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "max_depth_iterations",
                reason: "must be at least 1".into(),
            });
        }
        if !self.depth_correction_factor.is_finite() {
            return Err(ConfigError::InvalidSetting {
                field: "depth_correction_factor",
                reason: "must be finite".into(),
            });
        }
        if !(self.recommended_allowance_m.is_finite() && self.recommended_allowance_m >= 0.0) {
            return Err(ConfigError::InvalidSetting {
                field: "recommended_allowance_m",
                reason: "must be finite and not negative".into(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            field,
            reason: format!("{value} is not a positive number"),
        })
    }
}
