//! Skeleton layouts
//!
//! The upstream pose model fixes the landmark cardinality K. Two layouts are
//! supported: MediaPipe Pose (33 landmarks) and COCO keypoints (17).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FormcheckError;

/// A limb segment between two landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bone {
    pub from: usize,
    pub to: usize,
}

impl Bone {
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

const MEDIA_PIPE_JOINTS: [&str; 33] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

const COCO_JOINTS: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

// Arms, shoulder line, torso sides, hip line
const MEDIA_PIPE_LIMBS: [Bone; 8] = [
    Bone::new(11, 13),
    Bone::new(13, 15),
    Bone::new(12, 14),
    Bone::new(14, 16),
    Bone::new(11, 12),
    Bone::new(11, 23),
    Bone::new(12, 24),
    Bone::new(23, 24),
];

const COCO_LIMBS: [Bone; 8] = [
    Bone::new(5, 7),
    Bone::new(7, 9),
    Bone::new(6, 8),
    Bone::new(8, 10),
    Bone::new(5, 6),
    Bone::new(5, 11),
    Bone::new(6, 12),
    Bone::new(11, 12),
];

/// Landmark layout produced by the pose model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonLayout {
    #[default]
    MediaPipe,
    Coco,
}

impl SkeletonLayout {
    /// Number of landmarks (K)
    pub fn landmark_count(self) -> usize {
        self.joint_names().len()
    }

    /// Length of the flattened vector (2K)
    pub fn vector_len(self) -> usize {
        self.landmark_count() * 2
    }

    pub fn joint_names(self) -> &'static [&'static str] {
        match self {
            SkeletonLayout::MediaPipe => &MEDIA_PIPE_JOINTS,
            SkeletonLayout::Coco => &COCO_JOINTS,
        }
    }

    pub fn joint_name(self, index: usize) -> Option<&'static str> {
        self.joint_names().get(index).copied()
    }

    /// Bones checked by the limb alignment comparison
    pub fn limb_bones(self) -> &'static [Bone] {
        match self {
            SkeletonLayout::MediaPipe => &MEDIA_PIPE_LIMBS,
            SkeletonLayout::Coco => &COCO_LIMBS,
        }
    }
}

impl fmt::Display for SkeletonLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkeletonLayout::MediaPipe => write!(f, "media-pipe"),
            SkeletonLayout::Coco => write!(f, "coco"),
        }
    }
}

impl FromStr for SkeletonLayout {
    type Err = FormcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "media-pipe" | "media_pipe" | "mediapipe" => Ok(SkeletonLayout::MediaPipe),
            "coco" => Ok(SkeletonLayout::Coco),
            other => Err(FormcheckError::InvalidConfig(format!(
                "unknown skeleton layout '{}'",
                other
            ))),
        }
    }
}
