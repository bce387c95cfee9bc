//! Seeded pose generation
//!
//! Produces plausible-looking landmark tracks with jitter and detection
//! dropouts so pipeline behaviour can be exercised deterministically.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use formcheck_core::{Detection, Landmark, SkeletonLayout};

/// Noise configuration for generated tracks
#[derive(Clone, Debug)]
pub struct PoseNoise {
    /// Maximum absolute jitter per coordinate
    pub jitter: f32,
    /// Probability that a frame has no detection (0.0 - 1.0)
    pub dropout_rate: f64,
    /// Constant offset applied to every landmark
    pub offset: (f32, f32),
}

impl Default for PoseNoise {
    fn default() -> Self {
        PoseNoise {
            jitter: 0.0,
            dropout_rate: 0.0,
            offset: (0.0, 0.0),
        }
    }
}

impl PoseNoise {
    /// Exact copy of the base pose on every frame
    pub fn none() -> Self {
        Self::default()
    }

    /// Small tremor, always detected
    pub fn steady() -> Self {
        PoseNoise {
            jitter: 0.01,
            ..Self::default()
        }
    }

    /// Sloppy form and an unreliable detector
    pub fn sloppy() -> Self {
        PoseNoise {
            jitter: 0.1,
            dropout_rate: 0.2,
            offset: (0.08, 0.0),
        }
    }
}

/// Deterministic generator of landmark tracks
pub struct PoseGenerator {
    layout: SkeletonLayout,
    rng: StdRng,
}

impl PoseGenerator {
    pub fn with_seed(layout: SkeletonLayout, seed: u64) -> Self {
        Self {
            layout,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Base pose at animation phase `phase` (radians); every landmark is
    /// distinct and inside the unit square
    pub fn base_pose(&self, phase: f32) -> Detection {
        let count = self.layout.landmark_count();
        Detection::new(
            (0..count)
                .map(|i| {
                    let t = i as f32 / count as f32;
                    let x = 0.5 + 0.25 * (t * 6.0 + phase).sin();
                    let y = 0.1 + 0.8 * t;
                    Landmark::new(x, y)
                })
                .collect(),
        )
    }

    /// Apply noise to a pose; `None` models a dropped detection
    pub fn perturb(&mut self, pose: &Detection, noise: &PoseNoise) -> Option<Detection> {
        if noise.dropout_rate > 0.0 && self.rng.gen_bool(noise.dropout_rate.min(1.0)) {
            return None;
        }
        let jitter = (noise.jitter > 0.0).then(|| Uniform::new_inclusive(-noise.jitter, noise.jitter));
        let landmarks = pose
            .landmarks
            .iter()
            .map(|l| {
                let (dx, dy) = match &jitter {
                    Some(dist) => (dist.sample(&mut self.rng), dist.sample(&mut self.rng)),
                    None => (0.0, 0.0),
                };
                Landmark::new(l.x + noise.offset.0 + dx, l.y + noise.offset.1 + dy)
            })
            .collect();
        Some(Detection::new(landmarks))
    }

    /// A moving track of `frames` poses
    pub fn track(&mut self, frames: usize, noise: &PoseNoise) -> Vec<Option<Detection>> {
        (0..frames)
            .map(|i| {
                let base = self.base_pose(i as f32 * 0.1);
                self.perturb(&base, noise)
            })
            .collect()
    }
}
