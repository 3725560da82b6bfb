// src/analysis/rules.rs
//! Exercise rule table
//!
//! Each exercise is described entirely by data: the joints forming its
//! primary angle, the conditions marking the rest and peak positions, and an
//! ordered list of cheat checks. Adding an exercise means adding a
//! [`RuleSet`], not a new code path.

use crate::analysis::gate::ValidatedPose;
use crate::config::exercise_config::{
    validate_exercise_config, BicepCurlConfig, ExerciseConfigs, FrontRaiseConfig, UprightRowConfig,
};
use crate::config::SystemConfig;
use crate::error::{CoreError, CoreResult};
use crate::error_context;
use crate::pose::types::{BodySide, Joint, Landmark};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exercises the rule table knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[default]
    BicepCurl,
    UprightRow,
    FrontRaise,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [
        ExerciseKind::BicepCurl,
        ExerciseKind::UprightRow,
        ExerciseKind::FrontRaise,
    ];

    /// Identifier used in config files and on the command line
    pub fn key(self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "bicep_curl",
            ExerciseKind::UprightRow => "upright_row",
            ExerciseKind::FrontRaise => "front_raise",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "Standing Bicep Curl",
            ExerciseKind::UprightRow => "Standing Upright Row",
            ExerciseKind::FrontRaise => "Standing Front Raise",
        }
    }

    /// One-line technique reminder shown before a set
    pub fn coaching_tip(self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "Lock your elbows at your sides and don't rock your body to swing the weight.",
            ExerciseKind::UprightRow => "Pull the elbows only to shoulder height, never above your ears.",
            ExerciseKind::FrontRaise => "Raise only to eye level (about 90 degrees) and keep your back straight.",
        }
    }

    fn index(self) -> usize {
        match self {
            ExerciseKind::BicepCurl => 0,
            ExerciseKind::UprightRow => 1,
            ExerciseKind::FrontRaise => 2,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExerciseKind {
    type Err = CoreError;

    /// Accepts config keys (`bicep_curl`, `bicep-curl`) and display names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| {
                normalized == kind.key()
                    || normalized == kind.display_name().to_lowercase().replace(' ', "_")
            })
            .ok_or_else(|| {
                CoreError::invalid_data(
                    error_context!("rules", "parse_exercise"),
                    "exercise",
                    format!("unknown exercise '{}'", s),
                )
            })
    }
}

/// Image axis. `y` grows downwards, so "above" means a smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    LessThan,
    GreaterThan,
}

/// Predicate over a validated pose and its primary angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    AngleAbove { degrees: f32 },
    AngleBelow { degrees: f32 },
    /// Inclusive on both ends
    AngleWithin { min: f32, max: f32 },
    /// `joint.axis <comparison> reference.axis + offset`
    Offset {
        joint: Joint,
        reference: Joint,
        axis: Axis,
        comparison: Comparison,
        offset: f32,
    },
    /// `|joint.axis - reference.axis| > limit`
    Spread {
        joint: Joint,
        reference: Joint,
        axis: Axis,
        limit: f32,
    },
}

impl Condition {
    /// Evaluate against a frame. Conditions naming a joint the pose lacks are false.
    pub fn holds(&self, pose: &ValidatedPose, angle: f32) -> bool {
        match *self {
            Condition::AngleAbove { degrees } => angle > degrees,
            Condition::AngleBelow { degrees } => angle < degrees,
            Condition::AngleWithin { min, max } => (min..=max).contains(&angle),
            Condition::Offset { joint, reference, axis, comparison, offset } => {
                match (pose.point(joint), pose.point(reference)) {
                    (Some(p), Some(r)) => {
                        let (value, bound) = match axis {
                            Axis::X => (p.x, r.x + offset),
                            Axis::Y => (p.y, r.y + offset),
                        };
                        match comparison {
                            Comparison::LessThan => value < bound,
                            Comparison::GreaterThan => value > bound,
                        }
                    }
                    _ => false,
                }
            }
            Condition::Spread { joint, reference, axis, limit } => {
                match (pose.point(joint), pose.point(reference)) {
                    (Some(p), Some(r)) => {
                        let distance = match axis {
                            Axis::X => (p.x - r.x).abs(),
                            Axis::Y => (p.y - r.y).abs(),
                        };
                        distance > limit
                    }
                    _ => false,
                }
            }
        }
    }

    fn joints(&self) -> Vec<Joint> {
        match *self {
            Condition::Offset { joint, reference, .. } | Condition::Spread { joint, reference, .. } => {
                vec![joint, reference]
            }
            _ => Vec::new(),
        }
    }
}

/// Ordered joints whose interior angle at `vertex` is the primary metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleSpec {
    pub first: Joint,
    pub vertex: Joint,
    pub last: Joint,
}

impl AngleSpec {
    pub const fn new(first: Joint, vertex: Joint, last: Joint) -> Self {
        Self { first, vertex, last }
    }
}

/// A form fault and what to tell the lifter about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheatRule {
    pub condition: Condition,
    pub message: String,
}

impl CheatRule {
    pub fn new(condition: Condition, message: impl Into<String>) -> Self {
        Self {
            condition,
            message: message.into(),
        }
    }
}

/// Positive feedback, chosen by phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encouragement {
    /// Shown while lowered or on the way up
    pub at_rest: String,
    /// Shown at the top, right after a rep was counted
    pub at_peak: String,
}

/// Everything the analysis needs to know about one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub kind: ExerciseKind,
    pub side: BodySide,
    /// Exclusive confidence floor for every required landmark
    pub min_confidence: f32,
    pub primary_angle: AngleSpec,
    /// Fully extended / rest position
    pub down: Condition,
    /// Fully contracted / peak position
    pub up: Condition,
    /// Evaluated in order; the first match wins
    pub cheats: Vec<CheatRule>,
    pub encouragement: Encouragement,
}

impl RuleSet {
    pub fn bicep_curl(config: &BicepCurlConfig, side: BodySide) -> Self {
        Self {
            kind: ExerciseKind::BicepCurl,
            side,
            min_confidence: config.min_confidence,
            primary_angle: AngleSpec::new(Joint::Shoulder, Joint::Elbow, Joint::Wrist),
            down: Condition::AngleAbove { degrees: config.down_angle },
            up: Condition::AngleBelow { degrees: config.up_angle },
            cheats: vec![
                CheatRule::new(
                    Condition::Spread {
                        joint: Joint::Shoulder,
                        reference: Joint::Hip,
                        axis: Axis::X,
                        limit: config.sway_limit_px,
                    },
                    "Don't swing your body",
                ),
                CheatRule::new(
                    Condition::Offset {
                        joint: Joint::Elbow,
                        reference: Joint::Shoulder,
                        axis: Axis::Y,
                        comparison: Comparison::LessThan,
                        offset: -config.elbow_rise_margin_px,
                    },
                    "Keep your elbows down",
                ),
            ],
            encouragement: Encouragement {
                at_rest: "Perfect form".to_string(),
                at_peak: "Good squeeze, now lower slowly".to_string(),
            },
        }
    }

    pub fn upright_row(config: &UprightRowConfig, side: BodySide) -> Self {
        Self {
            kind: ExerciseKind::UprightRow,
            side,
            min_confidence: config.min_confidence,
            primary_angle: AngleSpec::new(Joint::Elbow, Joint::Shoulder, Joint::Hip),
            down: Condition::Offset {
                joint: Joint::Wrist,
                reference: Joint::Hip,
                axis: Axis::Y,
                comparison: Comparison::GreaterThan,
                offset: -config.wrist_down_offset_px,
            },
            up: Condition::Offset {
                joint: Joint::Wrist,
                reference: Joint::Shoulder,
                axis: Axis::Y,
                comparison: Comparison::LessThan,
                offset: config.wrist_up_offset_px,
            },
            cheats: vec![
                CheatRule::new(
                    Condition::Offset {
                        joint: Joint::Elbow,
                        reference: Joint::Shoulder,
                        axis: Axis::Y,
                        comparison: Comparison::LessThan,
                        offset: -config.elbow_rise_margin_px,
                    },
                    "Elbows too high, stop at shoulder level",
                ),
                CheatRule::new(
                    Condition::Offset {
                        joint: Joint::Wrist,
                        reference: Joint::Shoulder,
                        axis: Axis::X,
                        comparison: Comparison::LessThan,
                        offset: -config.grip_inset_px,
                    },
                    "Widen your grip",
                ),
            ],
            encouragement: Encouragement {
                at_rest: "Nice control".to_string(),
                at_peak: "Good pull, now lower slowly".to_string(),
            },
        }
    }

    pub fn front_raise(config: &FrontRaiseConfig, side: BodySide) -> Self {
        Self {
            kind: ExerciseKind::FrontRaise,
            side,
            min_confidence: config.min_confidence,
            primary_angle: AngleSpec::new(Joint::Elbow, Joint::Shoulder, Joint::Hip),
            down: Condition::AngleBelow { degrees: config.down_angle },
            up: Condition::AngleWithin {
                min: config.up_angle_min,
                max: config.up_angle_max,
            },
            cheats: vec![
                CheatRule::new(
                    Condition::AngleAbove { degrees: config.overshoot_angle },
                    "Too high, stop at eye level",
                ),
                CheatRule::new(
                    Condition::Offset {
                        joint: Joint::Shoulder,
                        reference: Joint::Hip,
                        axis: Axis::X,
                        comparison: Comparison::LessThan,
                        offset: -config.lean_back_px,
                    },
                    "Stand straight, don't lean back",
                ),
            ],
            encouragement: Encouragement {
                at_rest: "Nice control".to_string(),
                at_peak: "Hold at eye level, then lower slowly".to_string(),
            },
        }
    }

    /// Joints the gate must validate: the angle triple plus every joint any
    /// condition reads, in [`Joint::ALL`] order.
    pub fn required_joints(&self) -> Vec<Joint> {
        let mut used = vec![self.primary_angle.first, self.primary_angle.vertex, self.primary_angle.last];
        used.extend(self.down.joints());
        used.extend(self.up.joints());
        for cheat in &self.cheats {
            used.extend(cheat.condition.joints());
        }
        Joint::ALL.into_iter().filter(|joint| used.contains(joint)).collect()
    }

    pub fn required_landmarks(&self) -> Vec<Landmark> {
        self.required_joints()
            .into_iter()
            .map(|joint| joint.landmark(self.side))
            .collect()
    }
}

/// Read-only registry holding one [`RuleSet`] per [`ExerciseKind`]
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    // Indexed by ExerciseKind::index; always holds every kind
    rule_sets: Vec<RuleSet>,
}

impl RuleTable {
    /// Build every rule set from the exercise thresholds and tracked body side
    pub fn from_config(config: &SystemConfig) -> CoreResult<Self> {
        validate_exercise_config(&config.exercises)
            .map_err(|reason| CoreError::configuration(error_context!("rule_table", "from_config"), reason))?;

        Ok(Self::build(&config.exercises, config.session.body_side))
    }

    /// Default thresholds tracking the given body side
    pub fn with_side(side: BodySide) -> Self {
        Self::build(&ExerciseConfigs::default(), side)
    }

    fn build(config: &ExerciseConfigs, side: BodySide) -> Self {
        let rule_sets = ExerciseKind::ALL
            .into_iter()
            .map(|kind| match kind {
                ExerciseKind::BicepCurl => RuleSet::bicep_curl(&config.bicep_curl, side),
                ExerciseKind::UprightRow => RuleSet::upright_row(&config.upright_row, side),
                ExerciseKind::FrontRaise => RuleSet::front_raise(&config.front_raise, side),
            })
            .collect();
        Self { rule_sets }
    }

    pub fn get(&self, kind: ExerciseKind) -> &RuleSet {
        &self.rule_sets[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.iter()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::with_side(BodySide::default())
    }
}
