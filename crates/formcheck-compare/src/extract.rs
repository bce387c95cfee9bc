//! Keypoint extraction

use formcheck_core::{Detection, FormcheckResult, KeypointSet, SkeletonLayout};

/// Converts pose model output into fixed-cardinality keypoint sets
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypointExtractor {
    layout: SkeletonLayout,
}

impl KeypointExtractor {
    pub fn new(layout: SkeletonLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> SkeletonLayout {
        self.layout
    }

    /// Extract a keypoint set from a detection.
    ///
    /// `None` yields the all-zero sentinel of the layout's cardinality. That
    /// sentinel is indistinguishable from a body detected exactly at the
    /// origin, and similarity against it is defined as 0.0.
    ///
    /// A detection with the wrong number of landmarks is a contract
    /// violation by the pose model and is rejected rather than padded or
    /// truncated.
    pub fn extract(&self, detection: Option<&Detection>) -> FormcheckResult<KeypointSet> {
        let expected = self.layout.landmark_count();
        match detection {
            None => Ok(KeypointSet::zeros(expected)),
            Some(detection) => KeypointSet::from_landmarks(detection.landmarks.clone(), expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{FormcheckError, Landmark};
    use proptest::prelude::*;

    #[test]
    fn test_absent_detection_is_zero_set() {
        let extractor = KeypointExtractor::new(SkeletonLayout::MediaPipe);
        let set = extractor.extract(None).unwrap();
        assert_eq!(set.len(), 33);
        assert!(set.is_zero());
    }

    #[test]
    fn test_detection_is_copied_in_order() {
        let extractor = KeypointExtractor::new(SkeletonLayout::Coco);
        let landmarks: Vec<Landmark> = (0..17)
            .map(|i| Landmark::new(i as f32 / 17.0, 1.0 - i as f32 / 17.0))
            .collect();
        let set = extractor
            .extract(Some(&Detection::new(landmarks.clone())))
            .unwrap();
        assert_eq!(set.landmarks(), landmarks.as_slice());
    }

    #[test]
    fn test_wrong_cardinality_rejected() {
        let extractor = KeypointExtractor::new(SkeletonLayout::MediaPipe);
        let detection = Detection::new(vec![Landmark::new(0.5, 0.5); 17]);
        assert_eq!(
            extractor.extract(Some(&detection)),
            Err(FormcheckError::LandmarkCount {
                expected: 33,
                actual: 17
            })
        );
    }

    proptest! {
        #[test]
        fn prop_flattened_length_is_twice_landmark_count(
            coords in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 33),
        ) {
            let extractor = KeypointExtractor::new(SkeletonLayout::MediaPipe);
            let detection = Detection::new(coords.iter().map(|&(x, y)| Landmark::new(x, y)).collect());
            let set = extractor.extract(Some(&detection)).unwrap();
            prop_assert_eq!(set.flatten().len(), 66);
            prop_assert_eq!(extractor.extract(None).unwrap().flatten().len(), 66);
        }
    }
}
