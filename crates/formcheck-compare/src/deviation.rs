//! Per-joint deviation detection

use std::collections::BTreeSet;

use formcheck_core::{
    FormcheckError, FormcheckResult, KeypointSet, DEFAULT_DEVIATION_THRESHOLD,
};

/// Euclidean distance per joint between two sets of equal cardinality
pub fn joint_distances(a: &KeypointSet, b: &KeypointSet) -> FormcheckResult<Vec<f32>> {
    if a.len() != b.len() {
        return Err(FormcheckError::LandmarkCount {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a
        .landmarks()
        .iter()
        .zip(b.landmarks())
        .map(|(la, lb)| la.distance(lb))
        .collect())
}

/// Indices of joints whose distance is strictly greater than `threshold`.
///
/// Passing the zero sentinel on one side flags every joint that is not at
/// the origin on the other side; callers must not compare against an absent
/// detection.
pub fn find_problematic_joints(
    a: &KeypointSet,
    b: &KeypointSet,
    threshold: f32,
) -> FormcheckResult<BTreeSet<usize>> {
    Ok(joint_distances(a, b)?
        .into_iter()
        .enumerate()
        .filter(|(_, distance)| *distance > threshold)
        .map(|(index, _)| index)
        .collect())
}

/// Deviation detector bound to a configured threshold
#[derive(Debug, Clone, Copy)]
pub struct DeviationDetector {
    threshold: f32,
}

impl Default for DeviationDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DEVIATION_THRESHOLD)
    }
}

impl DeviationDetector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Problematic joints between two optional sets.
    ///
    /// Empty when either side is absent.
    pub fn detect(
        &self,
        a: Option<&KeypointSet>,
        b: Option<&KeypointSet>,
    ) -> FormcheckResult<BTreeSet<usize>> {
        match (a, b) {
            (Some(a), Some(b)) => find_problematic_joints(a, b, self.threshold),
            _ => Ok(BTreeSet::new()),
        }
    }
}
