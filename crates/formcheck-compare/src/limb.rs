//! Limb alignment
//!
//! Compares bone directions rather than joint positions, so a performer who
//! stands elsewhere in the frame but holds the same limb angles is not
//! penalized.

use std::f32::consts::PI;

use formcheck_core::{Bone, FormcheckError, FormcheckResult, KeypointSet, SkeletonLayout};

/// Unsigned angle between two 2D vectors in radians.
///
/// A zero-length vector counts as maximal deviation (π).
pub fn angle_between(v1: (f32, f32), v2: (f32, f32)) -> f32 {
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if mag1 == 0.0 || mag2 == 0.0 {
        return PI;
    }

    (dot / (mag1 * mag2)).clamp(-1.0, 1.0).acos()
}

/// Bone direction check for one skeleton layout
#[derive(Debug, Clone, Copy)]
pub struct LimbAlignment {
    layout: SkeletonLayout,
    threshold: f32,
}

impl LimbAlignment {
    /// `threshold` is in radians
    pub fn new(layout: SkeletonLayout, threshold: f32) -> Self {
        Self { layout, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Bones whose direction differs by more than the threshold
    pub fn misaligned_bones(
        &self,
        performed: &KeypointSet,
        reference: &KeypointSet,
    ) -> FormcheckResult<Vec<Bone>> {
        let expected = self.layout.landmark_count();
        for set in [performed, reference] {
            if set.len() != expected {
                return Err(FormcheckError::LandmarkCount {
                    expected,
                    actual: set.len(),
                });
            }
        }

        let mut misaligned = Vec::new();
        for bone in self.layout.limb_bones() {
            let (Some(pa), Some(pb)) = (performed.get(bone.from), performed.get(bone.to)) else {
                continue;
            };
            let (Some(ra), Some(rb)) = (reference.get(bone.from), reference.get(bone.to)) else {
                continue;
            };
            if angle_between(pa.to(pb), ra.to(rb)) > self.threshold {
                misaligned.push(*bone);
            }
        }
        Ok(misaligned)
    }
}
