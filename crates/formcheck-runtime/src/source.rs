//! Frame source collaborator
//!
//! Video decoding is external. A source only has to hand out frames in
//! order and report when it is exhausted.

/// Stream properties queried once at startup, for display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoMetadata {
    pub fps: u32,
    pub frame_count: u64,
}

/// A sequential source of frames
pub trait FrameSource {
    type Frame;

    /// Whether the source opened successfully
    fn is_opened(&self) -> bool {
        true
    }

    fn metadata(&self) -> VideoMetadata;

    /// Next frame, or `None` once the source is exhausted
    fn read(&mut self) -> Option<Self::Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    type Frame = S::Frame;

    fn is_opened(&self) -> bool {
        (**self).is_opened()
    }

    fn metadata(&self) -> VideoMetadata {
        (**self).metadata()
    }

    fn read(&mut self) -> Option<Self::Frame> {
        (**self).read()
    }
}
