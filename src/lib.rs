//! RepCount-Core: real-time repetition counting and form feedback
//!
//! Turns a stream of 2D body keypoints from an external pose model into a
//! rep/set count and a form verdict for a selected free-weight exercise.
//!
//! - Keypoint gate that rejects unreliable frames without touching state
//! - Data-driven exercise rule table (phase thresholds and cheat checks)
//! - Hysteresis rep/set state machine, one session per video stream
//! - Layered TOML configuration with hot reload
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use repcount_core::analysis::{ExerciseKind, FrameAnalyzer, RuleTable, Session};
//! use repcount_core::pose::{Keypoint, Landmark, PoseSnapshot};
//! use std::sync::Arc;
//!
//! let mut analyzer = FrameAnalyzer::new(Arc::new(RuleTable::default()));
//! let mut session = Session::new(ExerciseKind::BicepCurl, 10)?;
//!
//! let pose = PoseSnapshot::new()
//!     .with(Landmark::RightShoulder, Keypoint::new(320.0, 200.0, 0.9))
//!     .with(Landmark::RightElbow, Keypoint::new(320.0, 310.0, 0.9))
//!     .with(Landmark::RightWrist, Keypoint::new(330.0, 410.0, 0.9))
//!     .with(Landmark::RightHip, Keypoint::new(320.0, 400.0, 0.9));
//!
//! let output = analyzer.analyze(&mut session, Some(&pose));
//! println!("{} reps, {}", output.rep_count, output.feedback.message);
//! # Ok::<(), repcount_core::CoreError>(())
//! ```

#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod pose;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::{
    ExerciseKind, Feedback, FrameAnalyzer, FrameOutput, FrameStatus, Phase, RuleTable, Session,
    SessionRegistry, Severity, StreamId,
};
pub use config::{ConfigError, ConfigLoader, SystemConfig};
pub use error::{CoreError, CoreResult, Rejection};
pub use pose::{Keypoint, Landmark, PoseSnapshot, PoseSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    let mut features = vec![
        "Keypoint confidence gate".to_string(),
        "Data-driven exercise rule table".to_string(),
        "Hysteresis rep/set counting".to_string(),
        "Layered TOML configuration".to_string(),
    ];
    if cfg!(feature = "hot-reload") {
        features.push("Configuration hot reload".to_string());
    }
    if cfg!(feature = "simulation") {
        features.push("Synthetic pose streams".to_string());
    }

    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Real-time repetition counting and form feedback core".to_string(),
        exercises: ExerciseKind::ALL.iter().map(|kind| kind.display_name().to_string()).collect(),
        features,
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// Display names of the supported exercises
    pub exercises: Vec<String>,
    /// List of features
    pub features: Vec<String>,
}
