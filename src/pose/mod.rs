// src/pose/mod.rs
//! Pose input: keypoint types and the pose-source seam

pub mod types;
pub mod traits;

#[cfg(feature = "simulation")]
pub mod simulator;

pub use traits::PoseSource;
pub use types::{BodySide, Joint, Keypoint, Landmark, Point2, PoseSnapshot, COCO_LANDMARK_COUNT};

#[cfg(feature = "simulation")]
pub use simulator::{PoseSimulator, SimulatorConfig, SimulatorError};
