//! Similarity scoring

use formcheck_core::{FlattenedVector, FormcheckError, FormcheckResult, KeypointSet};

/// Cosine similarity between two flattened keypoint vectors.
///
/// Returns a value in [-1, 1]. If either vector has zero magnitude the
/// result is exactly 0.0: the zero vector is the "no detection" sentinel, so
/// it is compared with exact equality and no tolerance.
pub fn cosine_similarity(a: &FlattenedVector, b: &FlattenedVector) -> FormcheckResult<f64> {
    if a.len() != b.len() {
        return Err(FormcheckError::VectorLength {
            left: a.len(),
            right: b.len(),
        });
    }

    let magnitude_a = a.magnitude();
    let magnitude_b = b.magnitude();
    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    // Rounding can push |cos| a hair past 1
    Ok((a.dot(b) / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0))
}

/// Cosine similarity of two keypoint sets via their flattened form
pub fn pose_similarity(a: &KeypointSet, b: &KeypointSet) -> FormcheckResult<f64> {
    cosine_similarity(&a.flatten(), &b.flatten())
}
