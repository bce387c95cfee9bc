//! Scripted sources and estimators

use std::cell::Cell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use formcheck_core::Detection;
use formcheck_runtime::{EstimatorError, FrameSource, PoseEstimator, VideoMetadata};

/// A synthetic frame that carries what the pose model should "see"
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticFrame {
    /// Position of the frame within its own source
    pub index: u64,
    pub pose: Option<Detection>,
}

const SCRIPTED_FPS: u32 = 30;

/// Frame source over a fixed script
pub struct ScriptedSource {
    frames: VecDeque<SyntheticFrame>,
    frame_count: u64,
    opened: bool,
    reads: Rc<Cell<u64>>,
}

impl ScriptedSource {
    pub fn new(poses: Vec<Option<Detection>>) -> Self {
        let frame_count = poses.len() as u64;
        let frames = poses
            .into_iter()
            .enumerate()
            .map(|(index, pose)| SyntheticFrame {
                index: index as u64,
                pose,
            })
            .collect();
        Self {
            frames,
            frame_count,
            opened: true,
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// A source that failed to open
    pub fn unavailable() -> Self {
        let mut source = Self::new(Vec::new());
        source.opened = false;
        source
    }

    /// Shared counter of `read` calls, usable after the source is moved
    pub fn read_counter(&self) -> Rc<Cell<u64>> {
        self.reads.clone()
    }
}

impl FrameSource for ScriptedSource {
    type Frame = SyntheticFrame;

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            fps: SCRIPTED_FPS,
            frame_count: self.frame_count,
        }
    }

    fn read(&mut self) -> Option<SyntheticFrame> {
        self.reads.set(self.reads.get() + 1);
        self.frames.pop_front()
    }
}

/// Estimator that reports the pose baked into each synthetic frame
#[derive(Default)]
pub struct ScriptedEstimator {
    failing: HashSet<u64>,
    calls: Rc<Cell<u64>>,
    released: Rc<Cell<u32>>,
}

impl ScriptedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with an error on the given frame indices
    pub fn failing_on(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.failing.extend(indices);
        self
    }

    pub fn call_counter(&self) -> Rc<Cell<u64>> {
        self.calls.clone()
    }

    pub fn release_counter(&self) -> Rc<Cell<u32>> {
        self.released.clone()
    }
}

impl PoseEstimator for ScriptedEstimator {
    type Frame = SyntheticFrame;

    fn detect(&mut self, frame: &SyntheticFrame) -> Result<Option<Detection>, EstimatorError> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.contains(&frame.index) {
            return Err(EstimatorError(format!("scripted failure on frame {}", frame.index)));
        }
        Ok(frame.pose.clone())
    }

    fn release(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_counts_reads() {
        let mut source = ScriptedSource::new(vec![None, None]);
        let reads = source.read_counter();
        assert_eq!(source.metadata().frame_count, 2);
        assert!(source.read().is_some());
        assert!(source.read().is_some());
        assert!(source.read().is_none());
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn test_scripted_estimator_failures() {
        let mut estimator = ScriptedEstimator::new().failing_on([1]);
        let frame = |index| SyntheticFrame {
            index,
            pose: Some(Detection::default()),
        };
        assert!(estimator.detect(&frame(0)).is_ok());
        assert!(estimator.detect(&frame(1)).is_err());
        assert_eq!(estimator.call_counter().get(), 2);
    }
}
