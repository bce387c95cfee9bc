//! Pipeline configuration
//!
//! Thresholds are configurable defaults.
//! None of them is calibrated for a particular motion type.

use serde::{Deserialize, Serialize};

use crate::{FormcheckError, FormcheckResult, SkeletonLayout};

/// Default per-joint deviation threshold (15% of the frame dimension)
pub const DEFAULT_DEVIATION_THRESHOLD: f32 = 0.15;
/// Similarity strictly above this is graded Good
pub const DEFAULT_GOOD_SIMILARITY: f64 = 0.8;
/// Similarity strictly above this (and not Good) is graded Fair
pub const DEFAULT_FAIR_SIMILARITY: f64 = 0.6;

/// Comparison pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Landmark layout of the pose model
    #[serde(default)]
    pub layout: SkeletonLayout,
    /// Per-joint distance threshold in normalized units
    #[serde(default = "default_deviation_threshold")]
    pub deviation_threshold: f32,
    #[serde(default = "default_good_similarity")]
    pub good_similarity: f64,
    #[serde(default = "default_fair_similarity")]
    pub fair_similarity: f64,
    /// Limb angle threshold in radians; the limb check is off when unset
    #[serde(default)]
    pub limb_angle_threshold: Option<f32>,
    #[serde(default = "default_performed_label")]
    pub performed_label: String,
    #[serde(default = "default_reference_label")]
    pub reference_label: String,
}

fn default_deviation_threshold() -> f32 {
    DEFAULT_DEVIATION_THRESHOLD
}

fn default_good_similarity() -> f64 {
    DEFAULT_GOOD_SIMILARITY
}

fn default_fair_similarity() -> f64 {
    DEFAULT_FAIR_SIMILARITY
}

fn default_performed_label() -> String {
    "USER VIDEO".to_string()
}

fn default_reference_label() -> String {
    "PERFECT VIDEO".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            layout: SkeletonLayout::default(),
            deviation_threshold: default_deviation_threshold(),
            good_similarity: default_good_similarity(),
            fair_similarity: default_fair_similarity(),
            limb_angle_threshold: None,
            performed_label: default_performed_label(),
            reference_label: default_reference_label(),
        }
    }
}

impl PipelineConfig {
    /// Configuration for COCO-style 17 keypoint models
    pub fn coco() -> Self {
        Self {
            layout: SkeletonLayout::Coco,
            ..Self::default()
        }
    }

    pub fn with_deviation_threshold(mut self, threshold: f32) -> Self {
        self.deviation_threshold = threshold;
        self
    }

    pub fn with_limb_angle_threshold(mut self, radians: f32) -> Self {
        self.limb_angle_threshold = Some(radians);
        self
    }

    /// Reject values outside their domain
    pub fn validate(&self) -> FormcheckResult<()> {
        if !self.deviation_threshold.is_finite() || self.deviation_threshold < 0.0 {
            return Err(FormcheckError::InvalidConfig(format!(
                "deviation_threshold must be a finite value >= 0, got {}",
                self.deviation_threshold
            )));
        }
        if !self.good_similarity.is_finite() || !self.fair_similarity.is_finite() {
            return Err(FormcheckError::InvalidConfig(
                "similarity bands must be finite".to_string(),
            ));
        }
        if self.fair_similarity > self.good_similarity {
            return Err(FormcheckError::InvalidConfig(format!(
                "fair_similarity ({}) exceeds good_similarity ({})",
                self.fair_similarity, self.good_similarity
            )));
        }
        if let Some(angle) = self.limb_angle_threshold {
            if !angle.is_finite() || angle < 0.0 {
                return Err(FormcheckError::InvalidConfig(format!(
                    "limb_angle_threshold must be a finite value >= 0, got {}",
                    angle
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.layout, SkeletonLayout::MediaPipe);
        assert_eq!(config.deviation_threshold, 0.15);
        assert_eq!(config.good_similarity, 0.8);
        assert_eq!(config.fair_similarity, 0.6);
        assert!(config.limb_angle_threshold.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PipelineConfig =
            toml::from_str("layout = \"coco\"\ndeviation_threshold = 0.2\n").unwrap();
        assert_eq!(config.layout, SkeletonLayout::Coco);
        assert_eq!(config.deviation_threshold, 0.2);
        assert_eq!(config.reference_label, "PERFECT VIDEO");
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = PipelineConfig::default().with_deviation_threshold(-0.1);
        assert!(matches!(
            config.validate(),
            Err(FormcheckError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_bands() {
        let config = PipelineConfig {
            good_similarity: 0.5,
            fair_similarity: 0.7,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_limb_angle() {
        let config = PipelineConfig::default().with_limb_angle_threshold(f32::NAN);
        assert!(config.validate().is_err());
    }
}
