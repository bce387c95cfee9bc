//! Recording render sink

use std::collections::HashMap;

use formcheck_core::{ComparisonResult, SimilarityBand};
use formcheck_runtime::{PlaybackCommand, RenderInstruction, RenderSink};

use crate::SyntheticFrame;

/// What the sink saw on one render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub performed_index: u64,
    pub reference_index: u64,
    pub result: ComparisonResult,
    pub band: SimilarityBand,
    pub total_frames: u64,
    pub performed_label: String,
    pub reference_label: String,
}

/// Sink that records every instruction and replays a command schedule.
///
/// Commands are keyed by poll number (1-based), which equals the tick
/// number for ticks that reach the polling stage.
#[derive(Debug, Default)]
pub struct RecordingSink {
    schedule: HashMap<u64, PlaybackCommand>,
    polls: u64,
    rendered: Vec<RenderedFrame>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `command` on the `poll`-th poll
    pub fn with_command(mut self, poll: u64, command: PlaybackCommand) -> Self {
        self.schedule.insert(poll, command);
        self
    }

    pub fn rendered(&self) -> &[RenderedFrame] {
        &self.rendered
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Frame indices in render order, duplicates included
    pub fn rendered_indices(&self) -> Vec<u64> {
        self.rendered.iter().map(|r| r.result.frame_index).collect()
    }
}

impl RenderSink<SyntheticFrame> for RecordingSink {
    fn render(&mut self, instruction: &RenderInstruction<'_, SyntheticFrame>) {
        self.rendered.push(RenderedFrame {
            performed_index: instruction.performed_frame.index,
            reference_index: instruction.reference_frame.index,
            result: instruction.result.clone(),
            band: instruction.overlay.band,
            total_frames: instruction.overlay.total_frames,
            performed_label: instruction.labels.performed.clone(),
            reference_label: instruction.labels.reference.clone(),
        });
    }

    fn poll_command(&mut self) -> Option<PlaybackCommand> {
        self.polls += 1;
        self.schedule.remove(&self.polls)
    }
}
