//! Formcheck Compare - Pose comparison math
//!
//! Pure, side-effect free building blocks of the pipeline:
//!
//! - Keypoint extraction: detection (or its absence) into a fixed-size set
//! - Similarity scoring: cosine similarity over flattened keypoints
//! - Deviation detection: per-joint distance against a threshold
//! - Limb alignment: per-bone direction against an angle threshold
//! - Session aggregation: running statistics over per-frame scores

pub mod deviation;
pub mod extract;
pub mod limb;
pub mod session;
pub mod similarity;

pub use deviation::*;
pub use extract::*;
pub use limb::*;
pub use session::*;
pub use similarity::*;
