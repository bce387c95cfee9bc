//! Pose estimation collaborator and scoped detector handles

use std::fmt;

use formcheck_core::{Detection, StreamSide};
use thiserror::Error;

/// Failure inside the pose model for a single frame
#[derive(Error, Debug, Clone, PartialEq)]
#[error("pose estimation failed: {0}")]
pub struct EstimatorError(pub String);

/// Black-box pose model: one frame in, at most one body out.
///
/// Calls block until the model answers; there is no timeout.
pub trait PoseEstimator {
    type Frame;

    /// Landmarks of the detected body, or `None` when no body is found
    fn detect(&mut self, frame: &Self::Frame) -> Result<Option<Detection>, EstimatorError>;

    /// Release model resources. Called exactly once by the owning handle.
    fn release(&mut self) {}
}

impl<E: PoseEstimator + ?Sized> PoseEstimator for Box<E> {
    type Frame = E::Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Result<Option<Detection>, EstimatorError> {
        (**self).detect(frame)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Exclusively owned pose estimator for one stream.
///
/// Acquired when the pipeline is built and released when the handle is
/// dropped, on every exit path.
pub struct DetectorHandle<E: PoseEstimator> {
    side: StreamSide,
    estimator: E,
    failures: u64,
}

impl<E: PoseEstimator> DetectorHandle<E> {
    pub fn acquire(side: StreamSide, estimator: E) -> Self {
        tracing::debug!(%side, "pose detector acquired");
        Self {
            side,
            estimator,
            failures: 0,
        }
    }

    /// Frames on which the estimator reported an error
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Run the estimator. A failure counts as "no detection" for this frame
    /// and is not retried.
    pub fn detect(&mut self, frame: &E::Frame) -> Option<Detection> {
        match self.estimator.detect(frame) {
            Ok(detection) => detection,
            Err(e) => {
                self.failures += 1;
                tracing::warn!(side = %self.side, error = %e, "treating estimator failure as no detection");
                None
            }
        }
    }
}

impl<E: PoseEstimator> fmt::Debug for DetectorHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("side", &self.side)
            .field("failures", &self.failures)
            .finish()
    }
}

impl<E: PoseEstimator> Drop for DetectorHandle<E> {
    fn drop(&mut self) {
        self.estimator.release();
        tracing::debug!(side = %self.side, failures = self.failures, "pose detector released");
    }
}
