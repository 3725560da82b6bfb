// src/config/mod.rs
//! Configuration management: session defaults, exercise thresholds, logging

pub mod constants;
pub mod exercise_config;
pub mod schema_validator;
pub mod loader;

pub use constants::*;
pub use exercise_config::*;
pub use schema_validator::{SchemaValidator, ValidationError};
pub use loader::{ConfigError, ConfigLoader};

use crate::analysis::rules::ExerciseKind;
use crate::pose::types::BodySide;
use serde::{Deserialize, Serialize};

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub exercises: ExerciseConfigs,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied to every new session
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "defaults::reps_per_set")]
    pub reps_per_set: u32,

    #[serde(default)]
    pub default_exercise: ExerciseKind,

    /// Side of the body the rules read landmarks from
    #[serde(default)]
    pub body_side: BodySide,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn reps_per_set() -> u32 { session::DEFAULT_REPS_PER_SET }
    pub fn log_level() -> String { logging::DEFAULT_LEVEL.to_string() }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reps_per_set: defaults::reps_per_set(),
            default_exercise: ExerciseKind::default(),
            body_side: BodySide::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            json: false,
        }
    }
}

impl SystemConfig {
    /// Cross-field checks the per-key schema cannot express
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(session::MIN_REPS_PER_SET..=session::MAX_REPS_PER_SET).contains(&self.session.reps_per_set) {
            errors.push(format!(
                "session.reps_per_set must be between {} and {}, got {}",
                session::MIN_REPS_PER_SET,
                session::MAX_REPS_PER_SET,
                self.session.reps_per_set
            ));
        }

        if let Err(reason) = validate_exercise_config(&self.exercises) {
            errors.push(reason);
        }

        if !logging::LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "logging.level must be one of {:?}, got '{}'",
                logging::LEVELS,
                self.logging.level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            reps_per_set: self.session.reps_per_set,
            default_exercise: self.session.default_exercise,
            body_side: self.session.body_side,
            curl_band: (self.exercises.bicep_curl.up_angle, self.exercises.bicep_curl.down_angle),
            raise_window: (self.exercises.front_raise.up_angle_min, self.exercises.front_raise.up_angle_max),
            log_level: self.logging.level.clone(),
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub reps_per_set: u32,
    pub default_exercise: ExerciseKind,
    pub body_side: BodySide,
    /// (up, down) elbow angles
    pub curl_band: (f32, f32),
    pub raise_window: (f32, f32),
    pub log_level: String,
}
