//! Frame synchronizer
//!
//! Sources are aligned by call count, not by timestamp: each `advance`
//! reads exactly one frame from each side. Streams with different native
//! frame rates stay index aligned but drift in wall-clock meaning.
//!
//! When either side runs dry the synchronizer reports end of stream and
//! latches. The surviving stream is not drained further.

use formcheck_core::StreamSide;

use crate::{FrameSource, VideoMetadata};

/// Which sides were exhausted when the synchronizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEnd {
    pub performed_ended: bool,
    pub reference_ended: bool,
    /// Frame pairs delivered before the end
    pub frames_advanced: u64,
}

impl StreamEnd {
    /// Exhausted sides, performed first
    pub fn ended_sides(&self) -> Vec<StreamSide> {
        let mut sides = Vec::with_capacity(2);
        if self.performed_ended {
            sides.push(StreamSide::Performed);
        }
        if self.reference_ended {
            sides.push(StreamSide::Reference);
        }
        sides
    }
}

/// Result of one `advance` call
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStep<F> {
    Frames {
        /// Zero-based index of this frame pair
        index: u64,
        performed: F,
        reference: F,
    },
    EndOfStream(StreamEnd),
}

impl<F> SyncStep<F> {
    /// True when both sources produced a frame
    pub fn both_succeeded(&self) -> bool {
        matches!(self, SyncStep::Frames { .. })
    }
}

/// Lockstep reader over the performed and reference sources
pub struct FrameSynchronizer<A, B> {
    performed: A,
    reference: B,
    advanced: u64,
    calls: u64,
    ended: Option<StreamEnd>,
}

impl<A, B> FrameSynchronizer<A, B>
where
    A: FrameSource,
    B: FrameSource<Frame = A::Frame>,
{
    pub fn new(performed: A, reference: B) -> Self {
        Self {
            performed,
            reference,
            advanced: 0,
            calls: 0,
            ended: None,
        }
    }

    /// Metadata of both sources, performed first
    pub fn metadata(&self) -> (VideoMetadata, VideoMetadata) {
        (self.performed.metadata(), self.reference.metadata())
    }

    /// Frame count shown to the user: the shorter of the two streams
    pub fn display_frame_count(&self) -> u64 {
        let (performed, reference) = self.metadata();
        performed.frame_count.min(reference.frame_count)
    }

    /// First side that failed to open, if any
    pub fn unopened_side(&self) -> Option<StreamSide> {
        if !self.performed.is_opened() {
            Some(StreamSide::Performed)
        } else if !self.reference.is_opened() {
            Some(StreamSide::Reference)
        } else {
            None
        }
    }

    /// Read one frame from each source.
    ///
    /// Both sources are read on every call until one of them fails; from
    /// then on no source is read again.
    pub fn advance(&mut self) -> SyncStep<A::Frame> {
        self.calls += 1;
        if let Some(end) = self.ended {
            return SyncStep::EndOfStream(end);
        }

        let performed = self.performed.read();
        let reference = self.reference.read();

        match (performed, reference) {
            (Some(performed), Some(reference)) => {
                let index = self.advanced;
                self.advanced += 1;
                SyncStep::Frames {
                    index,
                    performed,
                    reference,
                }
            }
            (performed, reference) => {
                let end = StreamEnd {
                    performed_ended: performed.is_none(),
                    reference_ended: reference.is_none(),
                    frames_advanced: self.advanced,
                };
                self.ended = Some(end);
                SyncStep::EndOfStream(end)
            }
        }
    }

    /// Frame pairs delivered so far
    pub fn frames_advanced(&self) -> u64 {
        self.advanced
    }

    /// Total `advance` calls, including ones after the end
    pub fn advance_calls(&self) -> u64 {
        self.calls
    }
}
