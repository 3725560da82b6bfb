// src/pose/types.rs
//! Core types for pose-estimation input

use serde::{Deserialize, Serialize};

/// Number of landmarks in the COCO keypoint convention
pub const COCO_LANDMARK_COUNT: usize = 17;

/// 2D point in image pixel coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One tracked landmark for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in `[0, 1]`
    pub confidence: f32,
}

impl Keypoint {
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// COCO body landmark indices as emitted by YOLO-pose style models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Landmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Landmark {
    pub const ALL: [Landmark; COCO_LANDMARK_COUNT] = [
        Landmark::Nose,
        Landmark::LeftEye,
        Landmark::RightEye,
        Landmark::LeftEar,
        Landmark::RightEar,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftEye => "left_eye",
            Landmark::RightEye => "right_eye",
            Landmark::LeftEar => "left_ear",
            Landmark::RightEar => "right_ear",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
        }
    }
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of the body the rules track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Left,
    #[default]
    Right,
}

/// Anatomical joint used by exercise rules, independent of body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Joint {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
}

impl Joint {
    pub const ALL: [Joint; 4] = [Joint::Shoulder, Joint::Elbow, Joint::Wrist, Joint::Hip];

    pub fn landmark(self, side: BodySide) -> Landmark {
        match (self, side) {
            (Joint::Shoulder, BodySide::Left) => Landmark::LeftShoulder,
            (Joint::Shoulder, BodySide::Right) => Landmark::RightShoulder,
            (Joint::Elbow, BodySide::Left) => Landmark::LeftElbow,
            (Joint::Elbow, BodySide::Right) => Landmark::RightElbow,
            (Joint::Wrist, BodySide::Left) => Landmark::LeftWrist,
            (Joint::Wrist, BodySide::Right) => Landmark::RightWrist,
            (Joint::Hip, BodySide::Left) => Landmark::LeftHip,
            (Joint::Hip, BodySide::Right) => Landmark::RightHip,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Joint::Shoulder => 0,
            Joint::Elbow => 1,
            Joint::Wrist => 2,
            Joint::Hip => 3,
        }
    }
}

/// Keypoints of exactly one detected body for exactly one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseSnapshot {
    keypoints: [Option<Keypoint>; COCO_LANDMARK_COUNT],
}

impl PoseSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw model rows of `[x, y, confidence]` in COCO order.
    /// Rows beyond the 17th are ignored; missing rows leave landmarks absent.
    pub fn from_coco_rows(rows: &[[f32; 3]]) -> Self {
        let mut snapshot = Self::default();
        for (slot, row) in snapshot.keypoints.iter_mut().zip(rows) {
            *slot = Some(Keypoint::new(row[0], row[1], row[2]));
        }
        snapshot
    }

    /// Builder-style insert
    pub fn with(mut self, landmark: Landmark, keypoint: Keypoint) -> Self {
        self.set(landmark, keypoint);
        self
    }

    pub fn set(&mut self, landmark: Landmark, keypoint: Keypoint) {
        self.keypoints[landmark.index()] = Some(keypoint);
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints[landmark.index()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.keypoints.iter().filter(|k| k.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, &Keypoint)> {
        Landmark::ALL
            .into_iter()
            .zip(self.keypoints.iter())
            .filter_map(|(landmark, kp)| kp.as_ref().map(|kp| (landmark, kp)))
    }

    /// Reflect x coordinates about the vertical centre line of a frame
    /// `frame_width` pixels wide (selfie-view convention). Labels are kept.
    pub fn mirrored(&self, frame_width: f32) -> Self {
        let mut mirrored = self.clone();
        for kp in mirrored.keypoints.iter_mut().flatten() {
            kp.x = frame_width - kp.x;
        }
        mirrored
    }
}
