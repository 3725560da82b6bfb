// src/analysis/pipeline.rs
//! Per-frame analysis pipeline
//!
//! gate → geometry → state transition → classify. Every frame yields a
//! [`FrameOutput`]; frames the gate rejects leave the session untouched.

use crate::analysis::classifier::{Feedback, FormClassifier};
use crate::analysis::counter::{Phase, PhaseSignal, Transition};
use crate::analysis::gate::{validate_pose, ValidatedPose};
use crate::analysis::geometry::try_joint_angle;
use crate::analysis::rules::{ExerciseKind, RuleSet, RuleTable};
use crate::analysis::session::Session;
use crate::config::SystemConfig;
use crate::error::{CoreResult, Rejection};
use crate::pose::types::PoseSnapshot;
use crate::utils::time::{SystemTimeProvider, TimeProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Whether a frame reached the state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Analyzed,
    Rejected(Rejection),
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub exercise: ExerciseKind,
    pub phase: Phase,
    pub rep_count: u32,
    pub set_count: u32,
    pub reps_per_set: u32,
    /// Primary angle in degrees, when the frame got that far
    pub angle: Option<f32>,
    pub feedback: Feedback,
    pub status: FrameStatus,
}

impl FrameOutput {
    pub fn is_analyzed(&self) -> bool {
        self.status == FrameStatus::Analyzed
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzerMetrics {
    pub frames_processed: u64,
    pub frames_analyzed: u64,
    pub rejected_no_body: u64,
    pub rejected_low_confidence: u64,
    pub rejected_degenerate: u64,
    pub reps_counted: u64,
    pub sets_completed: u64,
    pub warnings_issued: u64,
    /// Frames where the up and down conditions held together
    pub ambiguous_frames: u64,
    pub average_processing_time_us: f32,
    pub max_processing_time_us: f32,
}

impl AnalyzerMetrics {
    pub fn frames_rejected(&self) -> u64 {
        self.rejected_no_body + self.rejected_low_confidence + self.rejected_degenerate
    }
}

/// Outcome of one analyzed frame before it is turned into output
struct Analysis {
    angle: f32,
    transition: Transition,
    feedback: Feedback,
}

/// Stateless with respect to sessions: one analyzer can serve many streams
pub struct FrameAnalyzer {
    rules: Arc<RuleTable>,
    time_provider: Arc<dyn TimeProvider>,
    metrics: AnalyzerMetrics,
}

impl FrameAnalyzer {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self::with_time_provider(rules, Arc::new(SystemTimeProvider))
    }

    pub fn with_time_provider(rules: Arc<RuleTable>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            rules,
            time_provider,
            metrics: AnalyzerMetrics::default(),
        }
    }

    pub fn from_config(config: &SystemConfig) -> CoreResult<Self> {
        Ok(Self::new(Arc::new(RuleTable::from_config(config)?)))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Swap in a rebuilt rule table between frames
    pub fn set_rules(&mut self, rules: Arc<RuleTable>) {
        debug!("Rule table replaced");
        self.rules = rules;
    }

    /// Analyze one frame for `session`. `None` means no body was detected.
    pub fn analyze(&mut self, session: &mut Session, snapshot: Option<&PoseSnapshot>) -> FrameOutput {
        let start_time = self.time_provider.now_nanos();
        let rules = self.rules.get(session.exercise());

        let output = match analyze_frame(rules, session, snapshot) {
            Ok(analysis) => {
                self.metrics.frames_analyzed += 1;
                match analysis.transition {
                    Transition::RepCompleted { rep } => {
                        self.metrics.reps_counted += 1;
                        info!(exercise = rules.kind.key(), rep, set = session.set_count(), "Rep counted");
                    }
                    Transition::SetCompleted { set } => {
                        self.metrics.reps_counted += 1;
                        self.metrics.sets_completed += 1;
                        info!(exercise = rules.kind.key(), set, "Set completed");
                    }
                    Transition::Ambiguous => {
                        self.metrics.ambiguous_frames += 1;
                        if self.metrics.ambiguous_frames == 1 {
                            warn!(
                                exercise = rules.kind.key(),
                                angle = analysis.angle,
                                "Up and down thresholds overlap for this body, reps cannot be counted; check the offsets against the lifter's torso length"
                            );
                        } else {
                            debug!(exercise = rules.kind.key(), angle = analysis.angle, "Up and down both hold, phase kept");
                        }
                    }
                    Transition::Hold | Transition::Lowered => {}
                }
                if analysis.feedback.is_warning() {
                    self.metrics.warnings_issued += 1;
                    debug!(exercise = rules.kind.key(), message = %analysis.feedback.message, "Form warning");
                }
                output_for(session, Some(analysis.angle), analysis.feedback, FrameStatus::Analyzed)
            }
            Err(rejection) => {
                match rejection {
                    Rejection::NoBodyDetected => self.metrics.rejected_no_body += 1,
                    Rejection::LowConfidence { .. } => self.metrics.rejected_low_confidence += 1,
                    Rejection::DegenerateGeometry { .. } => self.metrics.rejected_degenerate += 1,
                }
                debug!(exercise = rules.kind.key(), reason = rejection.code(), "Frame rejected: {}", rejection);
                output_for(session, None, Feedback::for_rejection(&rejection), FrameStatus::Rejected(rejection))
            }
        };

        let end_time = self.time_provider.now_nanos();
        let processing_time_us = end_time.saturating_sub(start_time) as f32 / 1000.0;
        self.update_performance_metrics(processing_time_us);
        trace!(processing_time_us, "Frame processed");

        output
    }

    /// Get current performance metrics
    pub fn metrics(&self) -> &AnalyzerMetrics {
        &self.metrics
    }

    /// Reset performance metrics
    pub fn reset_metrics(&mut self) {
        self.metrics = AnalyzerMetrics::default();
    }

    fn update_performance_metrics(&mut self, processing_time_us: f32) {
        self.metrics.frames_processed += 1;

        let n = self.metrics.frames_processed as f32;
        self.metrics.average_processing_time_us =
            (self.metrics.average_processing_time_us * (n - 1.0) + processing_time_us) / n;

        if processing_time_us > self.metrics.max_processing_time_us {
            self.metrics.max_processing_time_us = processing_time_us;
        }
    }
}

/// Everything that can reject happens before the session is touched
fn analyze_frame(rules: &RuleSet, session: &mut Session, snapshot: Option<&PoseSnapshot>) -> Result<Analysis, Rejection> {
    let pose = validate_pose(snapshot, rules)?;
    let angle = primary_angle(&pose, rules)?;

    let signal = PhaseSignal::new(rules.up.holds(&pose, angle), rules.down.holds(&pose, angle));
    let transition = session.state_mut().advance(signal);

    let feedback = FormClassifier::classify(&pose, angle, rules, session.phase());
    session.record_feedback(feedback.clone());

    Ok(Analysis {
        angle,
        transition,
        feedback,
    })
}

fn primary_angle(pose: &ValidatedPose, rules: &RuleSet) -> Result<f32, Rejection> {
    let spec = rules.primary_angle;
    let degenerate = Rejection::DegenerateGeometry {
        landmark: spec.vertex.landmark(rules.side),
    };

    match (pose.point(spec.first), pose.point(spec.vertex), pose.point(spec.last)) {
        (Some(a), Some(b), Some(c)) => try_joint_angle(a, b, c).ok_or(degenerate),
        _ => Err(degenerate),
    }
}

fn output_for(session: &Session, angle: Option<f32>, feedback: Feedback, status: FrameStatus) -> FrameOutput {
    FrameOutput {
        exercise: session.exercise(),
        phase: session.phase(),
        rep_count: session.rep_count(),
        set_count: session.set_count(),
        reps_per_set: session.reps_per_set(),
        angle,
        feedback,
        status,
    }
}
