//! Rendering collaborator
//!
//! The sink draws frames and annotations; it is also the channel through
//! which playback commands arrive, polled once per tick.

use formcheck_core::{ComparisonResult, KeypointSet, PipelineConfig, SimilarityBand, StreamSide};

use crate::PlaybackCommand;

/// Static per-stream captions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLabels {
    pub performed: String,
    pub reference: String,
}

impl FrameLabels {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            performed: config.performed_label.clone(),
            reference: config.reference_label.clone(),
        }
    }

    pub fn for_side(&self, side: StreamSide) -> &str {
        match side {
            StreamSide::Performed => &self.performed,
            StreamSide::Reference => &self.reference,
        }
    }
}

/// Info box contents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub similarity: f64,
    pub band: SimilarityBand,
    /// One-based
    pub frame_number: u64,
    /// Shorter stream's frame count from metadata; display only
    pub total_frames: u64,
    pub issue_count: usize,
}

impl Overlay {
    pub fn new(result: &ComparisonResult, total_frames: u64, config: &PipelineConfig) -> Self {
        Self {
            similarity: result.similarity,
            band: SimilarityBand::classify(result.similarity, config),
            frame_number: result.frame_number(),
            total_frames,
            issue_count: result.issue_count(),
        }
    }
}

/// Everything the sink needs to draw one tick
#[derive(Debug)]
pub struct RenderInstruction<'a, F> {
    pub performed_frame: &'a F,
    pub reference_frame: &'a F,
    /// Detected pose, `None` when the model found no body
    pub performed_pose: Option<&'a KeypointSet>,
    pub reference_pose: Option<&'a KeypointSet>,
    pub result: &'a ComparisonResult,
    pub overlay: Overlay,
    pub labels: &'a FrameLabels,
    /// Stream on which problematic joints are highlighted
    pub highlight: StreamSide,
}

impl<'a, F> RenderInstruction<'a, F> {
    pub fn pose(&self, side: StreamSide) -> Option<&'a KeypointSet> {
        match side {
            StreamSide::Performed => self.performed_pose,
            StreamSide::Reference => self.reference_pose,
        }
    }

    pub fn frame(&self, side: StreamSide) -> &'a F {
        match side {
            StreamSide::Performed => self.performed_frame,
            StreamSide::Reference => self.reference_frame,
        }
    }
}

/// Display collaborator
pub trait RenderSink<F> {
    /// Draw one frame pair. While paused the same pair is sent every tick.
    fn render(&mut self, instruction: &RenderInstruction<'_, F>);

    /// At most one pending user command
    fn poll_command(&mut self) -> Option<PlaybackCommand>;
}

impl<F, S: RenderSink<F> + ?Sized> RenderSink<F> for &mut S {
    fn render(&mut self, instruction: &RenderInstruction<'_, F>) {
        (**self).render(instruction)
    }

    fn poll_command(&mut self) -> Option<PlaybackCommand> {
        (**self).poll_command()
    }
}
