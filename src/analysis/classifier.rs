// src/analysis/classifier.rs
//! Form classifier

use crate::analysis::counter::Phase;
use crate::analysis::gate::ValidatedPose;
use crate::analysis::rules::RuleSet;
use crate::error::Rejection;
use serde::{Deserialize, Serialize};

/// How a renderer should treat a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    /// Neutral status for frames that could not be analyzed
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
}

impl Feedback {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Ok,
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warn,
        }
    }

    /// Neutral message for a frame the gate turned away
    pub fn for_rejection(rejection: &Rejection) -> Self {
        let message = match rejection {
            Rejection::NoBodyDetected => "No person detected",
            Rejection::LowConfidence { .. } | Rejection::DegenerateGeometry { .. } => {
                "Show your arms clearly to the camera"
            }
        };
        Self {
            message: message.to_string(),
            severity: Severity::Notice,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

/// Stateless per frame; `phase` is the phase after this frame's transition
pub struct FormClassifier;

impl FormClassifier {
    /// First matching cheat rule wins, otherwise phase-appropriate encouragement
    pub fn classify(pose: &ValidatedPose, angle: f32, rules: &RuleSet, phase: Phase) -> Feedback {
        if let Some(cheat) = rules.cheats.iter().find(|cheat| cheat.condition.holds(pose, angle)) {
            return Feedback::warn(cheat.message.clone());
        }

        match phase {
            Phase::Up => Feedback::ok(rules.encouragement.at_peak.clone()),
            Phase::Down => Feedback::ok(rules.encouragement.at_rest.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rules::{ExerciseKind, RuleTable};
    use crate::pose::types::{BodySide, Joint, Point2};

    fn curl_pose(shoulder: (f32, f32), elbow: (f32, f32)) -> ValidatedPose {
        ValidatedPose::from_points(
            BodySide::Right,
            &[
                (Joint::Shoulder, Point2::from(shoulder)),
                (Joint::Elbow, Point2::from(elbow)),
                (Joint::Wrist, Point2::new(320.0, 410.0)),
                (Joint::Hip, Point2::new(320.0, 400.0)),
            ],
        )
    }

    #[test]
    fn test_clean_curl_is_encouraged_by_phase() {
        let table = RuleTable::default();
        let rules = table.get(ExerciseKind::BicepCurl);
        let pose = curl_pose((320.0, 200.0), (320.0, 310.0));

        let resting = FormClassifier::classify(&pose, 170.0, rules, Phase::Down);
        let peaked = FormClassifier::classify(&pose, 20.0, rules, Phase::Up);

        assert_eq!(resting, Feedback::ok("Perfect form"));
        assert_eq!(peaked, Feedback::ok("Good squeeze, now lower slowly"));
    }

    #[test]
    fn test_sway_beats_raised_elbow() {
        let table = RuleTable::default();
        let rules = table.get(ExerciseKind::BicepCurl);
        // Shoulder 80px right of the hip and elbow above the shoulder
        let pose = curl_pose((400.0, 200.0), (400.0, 150.0));

        let feedback = FormClassifier::classify(&pose, 90.0, rules, Phase::Down);
        assert_eq!(feedback, Feedback::warn("Don't swing your body"));
    }

    #[test]
    fn test_raised_elbow_alone() {
        let table = RuleTable::default();
        let rules = table.get(ExerciseKind::BicepCurl);
        let pose = curl_pose((320.0, 200.0), (330.0, 190.0));

        let feedback = FormClassifier::classify(&pose, 90.0, rules, Phase::Down);
        assert_eq!(feedback.message, "Keep your elbows down");
        assert!(feedback.is_warning());
    }

    #[test]
    fn test_front_raise_overshoot_beats_lean() {
        let table = RuleTable::default();
        let rules = table.get(ExerciseKind::FrontRaise);
        let pose = ValidatedPose::from_points(
            BodySide::Right,
            &[
                (Joint::Shoulder, Point2::new(250.0, 200.0)),
                (Joint::Elbow, Point2::new(250.0, 90.0)),
                (Joint::Hip, Point2::new(320.0, 400.0)),
            ],
        );

        let feedback = FormClassifier::classify(&pose, 120.0, rules, Phase::Up);
        assert_eq!(feedback.message, "Too high, stop at eye level");

        let feedback = FormClassifier::classify(&pose, 60.0, rules, Phase::Down);
        assert_eq!(feedback.message, "Stand straight, don't lean back");
    }

    #[test]
    fn test_rejection_feedback_is_neutral() {
        let feedback = Feedback::for_rejection(&Rejection::NoBodyDetected);
        assert_eq!(feedback.severity, Severity::Notice);
        assert!(!feedback.is_warning());
    }
}
