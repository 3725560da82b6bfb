// src/analysis/mod.rs
//! Per-frame exercise analysis
//!
//! Leaves first: geometry, the keypoint gate, the rule table, the rep/set
//! state machine, the form classifier, sessions, and the pipeline that runs
//! them in order for each frame.

pub mod geometry;
pub mod gate;
pub mod rules;
pub mod counter;
pub mod classifier;
pub mod session;
pub mod pipeline;

pub use classifier::{Feedback, FormClassifier, Severity};
pub use counter::{Phase, PhaseSignal, RepState, Transition};
pub use gate::{validate_pose, ValidatedPose};
pub use geometry::{joint_angle, try_joint_angle};
pub use pipeline::{AnalyzerMetrics, FrameAnalyzer, FrameOutput, FrameStatus};
pub use rules::{AngleSpec, Axis, CheatRule, Comparison, Condition, Encouragement, ExerciseKind, RuleSet, RuleTable};
pub use session::{Session, SessionRegistry, StreamId};
