//! Error types

use thiserror::Error;

/// Errors raised by the evaluation pipeline and the detector library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Probability matrix has {actual} classes, expected {expected}")]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error("Model label encoder diverges from the global label set")]
    EncoderMismatch,

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Detector requires input `{0}` which was not provided")]
    MissingInput(&'static str),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Model error: {0}")]
    Model(String),
}

/// Result type for all fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;
