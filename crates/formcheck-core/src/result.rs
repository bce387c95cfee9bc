//! Per-frame comparison results and session statistics

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Bone, PipelineConfig};

/// Coarse similarity grading used for overlay coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    Good,
    Fair,
    Poor,
}

impl SimilarityBand {
    /// Grade a score against the configured band thresholds (strict `>`)
    pub fn classify(score: f64, config: &PipelineConfig) -> Self {
        if score > config.good_similarity {
            SimilarityBand::Good
        } else if score > config.fair_similarity {
            SimilarityBand::Fair
        } else {
            SimilarityBand::Poor
        }
    }
}

/// Outcome of comparing one synchronized frame pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Zero-based index of the frame pair within the session
    pub frame_index: u64,
    /// Cosine similarity in [-1, 1]; 0.0 when no comparison was possible
    pub similarity: f64,
    /// Joints whose deviation exceeds the threshold, ascending
    pub problematic_joints: BTreeSet<usize>,
    /// Bones whose direction differs beyond the limb angle threshold
    pub misaligned_bones: Vec<Bone>,
    /// Both streams produced a detection for this frame
    pub both_detected: bool,
}

impl ComparisonResult {
    /// Result for a frame where at least one side had no detection
    pub fn no_comparison(frame_index: u64) -> Self {
        Self {
            frame_index,
            similarity: 0.0,
            problematic_joints: BTreeSet::new(),
            misaligned_bones: Vec::new(),
            both_detected: false,
        }
    }

    /// Number of problematic joints
    pub fn issue_count(&self) -> usize {
        self.problematic_joints.len()
    }

    /// Problematic joints plus both endpoints of every misaligned bone
    pub fn flagged_joints(&self) -> BTreeSet<usize> {
        let mut joints = self.problematic_joints.clone();
        for bone in &self.misaligned_bones {
            joints.insert(bone.from);
            joints.insert(bone.to);
        }
        joints
    }

    /// One-based frame number for display
    pub fn frame_number(&self) -> u64 {
        self.frame_index + 1
    }
}

/// Finalized summary of a session's similarity scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Frames with a valid comparison
    pub count: u64,
}
