//! Error types for the score following engine

use std::fmt;

/// Errors that can occur while building or running a following session
#[derive(Debug, Clone, PartialEq)]
pub enum FollowerError {
    /// Invalid configuration (sample rate, FFT length, hop, DTW parameters)
    InvalidConfig(String),

    /// Caller contract violation (malformed chroma vector, empty reference, ...)
    InvalidInput(String),

    /// Audio frame length does not match the configured FFT length
    LengthMismatch {
        /// Expected number of samples
        expected: usize,
        /// Number of samples received
        actual: usize,
    },

    /// Live input ran past the live buffer capacity; the session cannot continue
    CapacityExceeded {
        /// Maximum number of live frames for this session
        capacity: usize,
    },

    /// Audio decoding error
    DecodingError(String),

    /// Processing error (resampling, framing)
    ProcessingError(String),
}

impl fmt::Display for FollowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            FollowerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            FollowerError::LengthMismatch { expected, actual } => write!(
                f,
                "Length mismatch: expected {} samples, got {}",
                expected, actual
            ),
            FollowerError::CapacityExceeded { capacity } => write!(
                f,
                "Live capacity exceeded: session holds at most {} frames",
                capacity
            ),
            FollowerError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            FollowerError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for FollowerError {}
