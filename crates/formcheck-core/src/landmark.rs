//! Landmarks and keypoint sets
//!
//! A `KeypointSet` always holds exactly K landmarks for its skeleton layout.
//! Absence of a detected body is the all-zero set, never a missing value, so
//! downstream math stays total.
//!
//! NOTE: the zero set also describes a body whose every landmark sits at the
//! frame origin. The two cases are indistinguishable once extracted; callers
//! that care must keep the detection flag alongside the set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FormcheckError, FormcheckResult};

/// Which of the two compared streams a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSide {
    /// The exercise being checked (left pane)
    Performed,
    /// The reference performance (right pane)
    Reference,
}

impl StreamSide {
    pub fn both() -> [StreamSide; 2] {
        [StreamSide::Performed, StreamSide::Reference]
    }
}

impl fmt::Display for StreamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSide::Performed => write!(f, "performed"),
            StreamSide::Reference => write!(f, "reference"),
        }
    }
}

/// Single tracked body point in normalized image coordinates
///
/// Coordinates are nominally in [0,1]; models may overshoot slightly and the
/// values are kept as reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const ORIGIN: Landmark = Landmark { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another landmark
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Vector from this landmark to `other`
    #[inline]
    pub fn to(&self, other: &Landmark) -> (f32, f32) {
        (other.x - self.x, other.y - self.y)
    }
}

/// Raw output of the pose-estimation collaborator for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub landmarks: Vec<Landmark>,
}

impl Detection {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

/// Ordered landmarks of one body in one frame, always of layout cardinality
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointSet {
    landmarks: Vec<Landmark>,
}

impl KeypointSet {
    /// The "no detection" sentinel: `count` landmarks at the origin
    pub fn zeros(count: usize) -> Self {
        Self {
            landmarks: vec![Landmark::ORIGIN; count],
        }
    }

    /// Build from landmarks, rejecting any count other than `expected`
    pub fn from_landmarks(landmarks: Vec<Landmark>, expected: usize) -> FormcheckResult<Self> {
        if landmarks.len() != expected {
            return Err(FormcheckError::LandmarkCount {
                expected,
                actual: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    /// Number of landmarks (K)
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// True when every landmark is exactly at the origin
    pub fn is_zero(&self) -> bool {
        self.landmarks.iter().all(|l| l.x == 0.0 && l.y == 0.0)
    }

    /// Interleave coordinates as (x0, y0, x1, y1, ...)
    pub fn flatten(&self) -> FlattenedVector {
        let mut values = Vec::with_capacity(self.landmarks.len() * 2);
        for landmark in &self.landmarks {
            values.push(landmark.x);
            values.push(landmark.y);
        }
        FlattenedVector(values)
    }
}

/// `KeypointSet` reinterpreted as a 2K vector for similarity scoring
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedVector(Vec<f32>);

impl FlattenedVector {
    pub fn from_values(values: Vec<f32>) -> Self {
        FlattenedVector(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Dot product accumulated in f64; lengths must already match
    pub fn dot(&self, other: &FlattenedVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum()
    }

    /// Euclidean norm accumulated in f64
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }
}
