// src/analysis/gate.rs
//! Keypoint gate: the single check every downstream stage depends on
//!
//! A frame passes only if every landmark its rule set needs is present,
//! finite, and strictly above the rule set's confidence floor. One weak
//! landmark rejects the whole frame.

use crate::analysis::rules::RuleSet;
use crate::error::Rejection;
use crate::pose::types::{BodySide, Joint, Point2, PoseSnapshot};

/// The landmarks a rule set needs, each known to be above its floor
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPose {
    side: BodySide,
    points: [Option<Point2>; 4],
}

impl ValidatedPose {
    /// Position of a joint. `None` only for joints the rule set never asked for.
    pub fn point(&self, joint: Joint) -> Option<Point2> {
        self.points[joint.slot()]
    }

    pub fn side(&self) -> BodySide {
        self.side
    }

    #[cfg(test)]
    pub(crate) fn from_points(side: BodySide, joints: &[(Joint, Point2)]) -> Self {
        let mut points = [None; 4];
        for (joint, point) in joints {
            points[joint.slot()] = Some(*point);
        }
        Self { side, points }
    }
}

/// Gate a frame's pose against a rule set.
///
/// `None` or a snapshot without a single keypoint means the pose model found
/// no body in the frame.
pub fn validate_pose(snapshot: Option<&PoseSnapshot>, rules: &RuleSet) -> Result<ValidatedPose, Rejection> {
    let snapshot = snapshot
        .filter(|snapshot| !snapshot.is_empty())
        .ok_or(Rejection::NoBodyDetected)?;

    let floor = rules.min_confidence;
    let mut points = [None; 4];
    let mut weakest: Option<Rejection> = None;
    let mut weakest_confidence = f32::INFINITY;

    for joint in rules.required_joints() {
        let landmark = joint.landmark(rules.side);
        let (confidence, point) = match snapshot.get(landmark) {
            Some(kp) if kp.position().is_finite() => (kp.confidence, Some(kp.position())),
            Some(_) | None => (0.0, None),
        };

        let passes = point.is_some() && confidence > floor;
        if passes {
            points[joint.slot()] = point;
            continue;
        }

        let reported = if confidence.is_nan() { 0.0 } else { confidence };
        if reported < weakest_confidence {
            weakest_confidence = reported;
            weakest = Some(Rejection::LowConfidence {
                landmark,
                confidence: reported,
                floor,
            });
        }
    }

    match weakest {
        Some(rejection) => Err(rejection),
        None => Ok(ValidatedPose {
            side: rules.side,
            points,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rules::{ExerciseKind, RuleTable};
    use crate::pose::types::{Keypoint, Landmark};

    fn arm(confidence: f32) -> PoseSnapshot {
        PoseSnapshot::new()
            .with(Landmark::RightShoulder, Keypoint::new(320.0, 200.0, confidence))
            .with(Landmark::RightElbow, Keypoint::new(320.0, 310.0, confidence))
            .with(Landmark::RightWrist, Keypoint::new(330.0, 410.0, confidence))
            .with(Landmark::RightHip, Keypoint::new(320.0, 400.0, confidence))
    }

    #[test]
    fn test_missing_body_is_rejected() {
        let table = RuleTable::default();
        let result = validate_pose(None, table.get(ExerciseKind::BicepCurl));
        assert_eq!(result, Err(Rejection::NoBodyDetected));
    }

    #[test]
    fn test_empty_snapshot_means_no_body() {
        let table = RuleTable::default();
        let empty = PoseSnapshot::from_coco_rows(&[]);
        let result = validate_pose(Some(&empty), table.get(ExerciseKind::BicepCurl));
        assert_eq!(result, Err(Rejection::NoBodyDetected));
    }

    #[test]
    fn test_confident_pose_passes() {
        let table = RuleTable::default();
        let pose = validate_pose(Some(&arm(0.9)), table.get(ExerciseKind::BicepCurl)).unwrap();

        assert_eq!(pose.point(Joint::Elbow), Some(Point2::new(320.0, 310.0)));
        assert_eq!(pose.side(), BodySide::Right);
    }

    #[test]
    fn test_single_weak_landmark_rejects_frame() {
        let table = RuleTable::default();
        let snapshot = arm(0.9).with(Landmark::RightWrist, Keypoint::new(330.0, 410.0, 0.3));

        match validate_pose(Some(&snapshot), table.get(ExerciseKind::BicepCurl)) {
            Err(Rejection::LowConfidence { landmark, confidence, floor }) => {
                assert_eq!(landmark, Landmark::RightWrist);
                assert_eq!(confidence, 0.3);
                assert_eq!(floor, 0.5);
            }
            other => panic!("Expected low confidence rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_floor_is_exclusive() {
        let table = RuleTable::default();
        let result = validate_pose(Some(&arm(0.5)), table.get(ExerciseKind::BicepCurl));
        assert!(matches!(result, Err(Rejection::LowConfidence { .. })));
    }

    #[test]
    fn test_stricter_floor_for_upright_row() {
        let table = RuleTable::default();
        let snapshot = arm(0.55);

        assert!(validate_pose(Some(&snapshot), table.get(ExerciseKind::BicepCurl)).is_ok());
        assert!(validate_pose(Some(&snapshot), table.get(ExerciseKind::UprightRow)).is_err());
    }

    #[test]
    fn test_missing_landmark_reports_zero_confidence() {
        let table = RuleTable::default();
        let snapshot = PoseSnapshot::new()
            .with(Landmark::RightShoulder, Keypoint::new(320.0, 200.0, 0.9))
            .with(Landmark::RightElbow, Keypoint::new(320.0, 310.0, 0.9))
            .with(Landmark::RightHip, Keypoint::new(320.0, 400.0, 0.9));

        let result = validate_pose(Some(&snapshot), table.get(ExerciseKind::BicepCurl));
        assert_eq!(
            result,
            Err(Rejection::LowConfidence {
                landmark: Landmark::RightWrist,
                confidence: 0.0,
                floor: 0.5,
            })
        );
    }

    #[test]
    fn test_left_side_rules_read_left_landmarks() {
        let table = RuleTable::with_side(BodySide::Left);
        let result = validate_pose(Some(&arm(0.9)), table.get(ExerciseKind::BicepCurl));

        assert!(matches!(
            result,
            Err(Rejection::LowConfidence { landmark: Landmark::LeftShoulder, .. })
        ));
    }
}
