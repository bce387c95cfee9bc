//! Recorded landmark tracks
//!
//! Decoding and pose estimation happen upstream. A track file holds what the
//! pose model reported for every frame of one video, so it stands in for
//! both the frame source and the model.
//!
//! ```json
//! { "fps": 30, "frames": [ { "landmarks": [ { "x": 0.5, "y": 0.2 } ] }, null ] }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use formcheck_core::{Detection, FormcheckError, FormcheckResult, StreamSide};
use formcheck_runtime::{EstimatorError, FrameSource, PoseEstimator, VideoMetadata};

#[derive(Debug, Deserialize)]
pub struct TrackFile {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// `null` marks a frame where no body was detected
    pub frames: Vec<Option<Detection>>,
}

fn default_fps() -> u32 {
    30
}

/// One recorded frame
#[derive(Debug, Clone)]
pub struct TrackFrame {
    pub index: u64,
    pub detection: Option<Detection>,
}

/// Frame source reading a track file front to back
#[derive(Debug)]
pub struct TrackSource {
    fps: u32,
    frames: std::vec::IntoIter<Option<Detection>>,
    frame_count: u64,
    next_index: u64,
}

impl TrackSource {
    pub fn open<P: AsRef<Path>>(path: P, side: StreamSide) -> FormcheckResult<Self> {
        let path = path.as_ref();
        let unavailable = |reason: String| FormcheckError::SourceUnavailable {
            side,
            reason: format!("{}: {}", path.display(), reason),
        };

        let content = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        Self::parse(&content).map_err(|e| unavailable(e.to_string()))
    }

    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<TrackFile>(content).map(Self::from_track)
    }

    pub fn from_track(track: TrackFile) -> Self {
        Self {
            fps: track.fps,
            frame_count: track.frames.len() as u64,
            frames: track.frames.into_iter(),
            next_index: 0,
        }
    }
}

impl FrameSource for TrackSource {
    type Frame = TrackFrame;

    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            fps: self.fps,
            frame_count: self.frame_count,
        }
    }

    fn read(&mut self) -> Option<TrackFrame> {
        let detection = self.frames.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(TrackFrame { index, detection })
    }
}

/// Replays the recorded model output attached to each frame
#[derive(Debug, Default)]
pub struct RecordedLandmarks;

impl PoseEstimator for RecordedLandmarks {
    type Frame = TrackFrame;

    fn detect(&mut self, frame: &TrackFrame) -> Result<Option<Detection>, EstimatorError> {
        Ok(frame.detection.clone())
    }
}
