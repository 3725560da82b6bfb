// src/config/constants.rs
//! System-wide configuration constants
//!
//! Every threshold the rule table uses has its default here, so the
//! per-exercise config structs and the schema validator never carry literals.

/// Session defaults
pub mod session {
    pub const DEFAULT_REPS_PER_SET: u32 = 10;
    pub const MIN_REPS_PER_SET: u32 = 1;
    pub const MAX_REPS_PER_SET: u32 = 100;
}

/// Keypoint gate constants
pub mod gate {
    /// Confidence floor used by most exercises
    pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;
    /// Floor for exercises whose cheat checks depend on small offsets
    pub const STRICT_MIN_CONFIDENCE: f32 = 0.6;
    pub const MIN_CONFIDENCE_FLOOR: f32 = 0.05;
    pub const MAX_CONFIDENCE_FLOOR: f32 = 0.99;
}

/// Geometry constants
pub mod geometry {
    /// Rays shorter than this (pixels) make an angle undefined
    pub const DEGENERATE_RAY_LENGTH_PX: f32 = 1e-3;
    pub const MAX_ANGLE_DEGREES: f32 = 180.0;
    pub const MAX_PIXEL_OFFSET: f32 = 1000.0;
}

/// Standing bicep curl defaults
pub mod bicep_curl {
    pub const DOWN_ANGLE_DEGREES: f32 = 160.0;
    pub const UP_ANGLE_DEGREES: f32 = 30.0;
    pub const SWAY_LIMIT_PX: f32 = 50.0;
    pub const ELBOW_RISE_MARGIN_PX: f32 = 0.0;
}

/// Standing upright row defaults
pub mod upright_row {
    /// Wrist counts as lowered once it is below `hip - offset`
    pub const WRIST_DOWN_OFFSET_PX: f32 = 50.0;
    /// Wrist counts as raised once it is above `shoulder + offset`
    pub const WRIST_UP_OFFSET_PX: f32 = 50.0;
    pub const ELBOW_RISE_MARGIN_PX: f32 = 20.0;
    pub const GRIP_INSET_PX: f32 = 50.0;
}

/// Standing front raise defaults
pub mod front_raise {
    pub const DOWN_ANGLE_DEGREES: f32 = 20.0;
    pub const UP_ANGLE_MIN_DEGREES: f32 = 80.0;
    pub const UP_ANGLE_MAX_DEGREES: f32 = 100.0;
    pub const OVERSHOOT_ANGLE_DEGREES: f32 = 100.0;
    pub const LEAN_BACK_PX: f32 = 30.0;
}

/// Synthetic pose stream defaults
pub mod simulator {
    pub const DEFAULT_FRAMES_PER_REP: u32 = 30;
    pub const MIN_FRAMES_PER_REP: u32 = 4;
    pub const DEFAULT_JITTER_PX: f32 = 0.0;
    pub const DEFAULT_DROPOUT_PROBABILITY: f32 = 0.0;
    pub const DEFAULT_SEED: u64 = 0x5EED;

    // Body geometry of the simulated lifter, pixels
    pub const SHOULDER_POSITION: (f32, f32) = (320.0, 200.0);
    pub const HIP_POSITION: (f32, f32) = (320.0, 400.0);
    pub const UPPER_ARM_LENGTH_PX: f32 = 110.0;
    pub const FOREARM_LENGTH_PX: f32 = 100.0;
    pub const DETECTED_CONFIDENCE: f32 = 0.9;
    pub const DROPOUT_CONFIDENCE: f32 = 0.2;
}

/// Logging defaults
pub mod logging {
    pub const DEFAULT_LEVEL: &str = "info";
    pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
}

/// File system paths
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/repcount/config.toml";
    pub const USER_CONFIG_DIR: &str = ".config/repcount";
    pub const DEFAULT_CONFIG_FILE: &str = "repcount.toml";
    pub const LOCAL_CONFIG_FILE: &str = "repcount.local.toml";

    /// Prefix of environment overrides, e.g. `REPCOUNT_SESSION__REPS_PER_SET`
    pub const ENV_PREFIX: &str = "REPCOUNT_";
    /// Separator between path segments in an override name
    pub const ENV_PATH_SEPARATOR: &str = "__";
}

/// Hot reload timing
pub mod reload {
    pub const WATCH_DEBOUNCE_MS: u64 = 500;
}
