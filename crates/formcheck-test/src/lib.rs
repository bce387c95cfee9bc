//! Formcheck Test Harness - Scripted collaborators and scenarios
//!
//! This crate provides:
//! - Scripted frame sources with read accounting
//! - Scripted pose estimators (detections, dropouts, failures)
//! - Recording render sinks with per-tick command schedules
//! - Seeded noisy pose generation
//! - End-to-end session scenarios

pub mod generator;
pub mod scenario;
pub mod sink;
pub mod source;

pub use generator::*;
pub use scenario::*;
pub use sink::*;
pub use source::*;
