// src/pose/simulator.rs
//! Synthetic pose stream
//!
//! Drives a right arm through repeated reps of one exercise. Each rep
//! follows a raised-cosine profile: rest at the first frame, peak halfway,
//! back to rest at the last. Jitter, dropped frames and torso sway can be
//! injected to exercise the gate and the cheat rules.

use crate::analysis::rules::ExerciseKind;
use crate::config::constants::simulator::*;
use crate::error::{CoreError, CoreResult};
use crate::error_context;
use crate::pose::traits::PoseSource;
use crate::pose::types::{Keypoint, Landmark, Point2, PoseSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub exercise: ExerciseKind,
    pub frames_per_rep: u32,
    /// `None` streams forever
    pub total_reps: Option<u32>,
    /// Uniform noise added to every coordinate, pixels
    pub jitter_px: f32,
    /// Chance that a frame has no body or a weak wrist
    pub dropout_probability: f32,
    /// Horizontal shift of the upper body away from the hip, pixels
    pub torso_sway_px: f32,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            exercise: ExerciseKind::default(),
            frames_per_rep: DEFAULT_FRAMES_PER_REP,
            total_reps: None,
            jitter_px: DEFAULT_JITTER_PX,
            dropout_probability: DEFAULT_DROPOUT_PROBABILITY,
            torso_sway_px: 0.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulatorConfig {
    pub fn for_reps(exercise: ExerciseKind, total_reps: u32) -> Self {
        Self {
            exercise,
            total_reps: Some(total_reps),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let context = || error_context!("pose_simulator", "validate");

        if self.frames_per_rep < MIN_FRAMES_PER_REP {
            return Err(CoreError::configuration(
                context(),
                format!("frames_per_rep must be at least {}", MIN_FRAMES_PER_REP),
            ));
        }
        if !(0.0..=1.0).contains(&self.dropout_probability) {
            return Err(CoreError::configuration(context(), "dropout_probability must be within 0..=1"));
        }
        if !self.jitter_px.is_finite() || self.jitter_px < 0.0 {
            return Err(CoreError::configuration(context(), "jitter_px must be a non-negative number"));
        }
        if !self.torso_sway_px.is_finite() {
            return Err(CoreError::configuration(context(), "torso_sway_px must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("simulator exhausted after {frames} frames")]
    Exhausted { frames: u64 },
}

pub struct PoseSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    frame_index: u64,
    total_frames: Option<u64>,
}

impl PoseSimulator {
    pub fn new(config: SimulatorConfig) -> CoreResult<Self> {
        config.validate()?;

        // One extra frame so the final rep ends back at rest
        let total_frames = config
            .total_reps
            .map(|reps| reps as u64 * config.frames_per_rep as u64 + 1);

        debug!(
            exercise = config.exercise.key(),
            frames_per_rep = config.frames_per_rep,
            ?total_frames,
            "Pose simulator created"
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            frame_index: 0,
            total_frames,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn frames_generated(&self) -> u64 {
        self.frame_index
    }

    /// Rep progress for a frame: 0 at rest, 1 at the peak
    pub fn progress_at(&self, frame: u64) -> f32 {
        let within = (frame % self.config.frames_per_rep as u64) as f32 / self.config.frames_per_rep as f32;
        (1.0 - (TAU * within).cos()) / 2.0
    }

    /// Noise-free pose at a given rep progress
    pub fn pose_at(&self, progress: f32) -> PoseSnapshot {
        let progress = progress.clamp(0.0, 1.0);
        let shoulder = Point2::from(SHOULDER_POSITION);
        let hip = Point2::from(HIP_POSITION);

        let (elbow, wrist) = match self.config.exercise {
            ExerciseKind::BicepCurl => {
                let elbow = Point2::new(shoulder.x, shoulder.y + UPPER_ARM_LENGTH_PX);
                let theta = (175.0 - 160.0 * progress).to_radians();
                let wrist = Point2::new(
                    elbow.x + FOREARM_LENGTH_PX * theta.sin(),
                    elbow.y - FOREARM_LENGTH_PX * theta.cos(),
                );
                (elbow, wrist)
            }
            ExerciseKind::FrontRaise => {
                let phi = (5.0 + 85.0 * progress).to_radians();
                let direction = Point2::new(phi.sin(), phi.cos());
                let reach = UPPER_ARM_LENGTH_PX + FOREARM_LENGTH_PX;
                (
                    Point2::new(shoulder.x + UPPER_ARM_LENGTH_PX * direction.x, shoulder.y + UPPER_ARM_LENGTH_PX * direction.y),
                    Point2::new(shoulder.x + reach * direction.x, shoulder.y + reach * direction.y),
                )
            }
            ExerciseKind::UprightRow => (
                lerp(Point2::new(335.0, 300.0), Point2::new(390.0, 205.0), progress),
                lerp(Point2::new(320.0, 390.0), Point2::new(320.0, 230.0), progress),
            ),
        };

        let sway = self.config.torso_sway_px;
        let detected = |p: Point2, dx: f32| Keypoint::new(p.x + dx, p.y, DETECTED_CONFIDENCE);

        PoseSnapshot::new()
            .with(Landmark::RightShoulder, detected(shoulder, sway))
            .with(Landmark::RightElbow, detected(elbow, sway))
            .with(Landmark::RightWrist, detected(wrist, sway))
            .with(Landmark::RightHip, detected(hip, 0.0))
    }

    fn add_jitter(&mut self, snapshot: &mut PoseSnapshot) {
        let jitter = self.config.jitter_px;
        if jitter <= 0.0 {
            return;
        }
        for landmark in [Landmark::RightShoulder, Landmark::RightElbow, Landmark::RightWrist, Landmark::RightHip] {
            if let Some(kp) = snapshot.get(landmark).copied() {
                let dx = self.rng.gen_range(-jitter..=jitter);
                let dy = self.rng.gen_range(-jitter..=jitter);
                snapshot.set(landmark, Keypoint::new(kp.x + dx, kp.y + dy, kp.confidence));
            }
        }
    }
}

impl PoseSource for PoseSimulator {
    type Error = SimulatorError;

    fn next_pose(&mut self) -> Result<Option<PoseSnapshot>, Self::Error> {
        if self.is_exhausted() {
            return Err(SimulatorError::Exhausted { frames: self.frame_index });
        }

        let progress = self.progress_at(self.frame_index);
        self.frame_index += 1;

        let dropout = self.config.dropout_probability;
        if dropout > 0.0 && self.rng.gen_bool(dropout as f64) {
            if self.rng.gen_bool(0.5) {
                return Ok(None);
            }
            let mut weak = self.pose_at(progress);
            if let Some(wrist) = weak.get(Landmark::RightWrist).copied() {
                weak.set(Landmark::RightWrist, Keypoint::new(wrist.x, wrist.y, DROPOUT_CONFIDENCE));
            }
            return Ok(Some(weak));
        }

        let mut snapshot = self.pose_at(progress);
        self.add_jitter(&mut snapshot);
        Ok(Some(snapshot))
    }

    fn is_exhausted(&self) -> bool {
        self.total_frames.is_some_and(|total| self.frame_index >= total)
    }

    fn describe(&self) -> String {
        match self.config.total_reps {
            Some(reps) => format!("simulated {} x{} ({} frames/rep)", self.config.exercise.key(), reps, self.config.frames_per_rep),
            None => format!("simulated {} ({} frames/rep)", self.config.exercise.key(), self.config.frames_per_rep),
        }
    }
}

fn lerp(from: Point2, to: Point2, t: f32) -> Point2 {
    Point2::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
}
