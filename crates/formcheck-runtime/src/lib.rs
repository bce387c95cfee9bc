//! Formcheck Runtime - Comparison pipeline and main loop
//!
//! One tick of the pipeline runs these stages:
//! 1. Gate on playback state (paused ticks redisplay the last pair)
//! 2. Advance both frame sources in lockstep
//! 3. Estimate poses on each frame
//! 4. Extract fixed-size keypoint sets
//! 5. Score similarity and detect deviating joints (both detected only)
//! 6. Record the score in the session aggregator
//! 7. Emit a render instruction to the sink
//! 8. Poll one playback command from the sink
//!
//! The loop is single threaded and cooperative. The external scheduler
//! decides when ticks happen; cancellation only ever takes effect between
//! ticks.

pub mod estimator;
pub mod pipeline;
pub mod playback;
pub mod render;
pub mod source;
pub mod sync;

pub use estimator::*;
pub use pipeline::*;
pub use playback::*;
pub use render::*;
pub use source::*;
pub use sync::*;
