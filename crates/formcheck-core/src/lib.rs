//! Formcheck Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every stage of the comparison
//! pipeline:
//! - Landmarks, detections and fixed-cardinality keypoint sets
//! - Skeleton layouts (landmark count, joint names, limb bones)
//! - Per-frame comparison results and session statistics
//! - Pipeline configuration and the error taxonomy

pub mod config;
pub mod error;
pub mod landmark;
pub mod layout;
pub mod result;

pub use config::*;
pub use error::*;
pub use landmark::*;
pub use layout::*;
pub use result::*;
