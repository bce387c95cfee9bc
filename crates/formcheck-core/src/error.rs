//! Error types for the comparison pipeline

use thiserror::Error;

use crate::StreamSide;

/// Core formcheck errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormcheckError {
    // Source errors
    #[error("{side} source unavailable: {reason}")]
    SourceUnavailable { side: StreamSide, reason: String },

    // Input validation errors
    #[error("Wrong landmark count: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Vector length mismatch: {left} vs {right}")]
    VectorLength { left: usize, right: usize },

    // Session errors
    #[error("Empty session: no comparable frames were recorded")]
    EmptySession,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FormcheckError {
    /// Whether this error aborts the run.
    ///
    /// `EmptySession` is an expected terminal condition with a defined
    /// outcome; everything else stops the pipeline.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FormcheckError::EmptySession)
    }

    /// Whether this is a cardinality violation between the pipeline and
    /// its pose-estimation collaborator.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            FormcheckError::LandmarkCount { .. } | FormcheckError::VectorLength { .. }
        )
    }
}

/// Result type for formcheck operations
pub type FormcheckResult<T> = Result<T, FormcheckError>;
