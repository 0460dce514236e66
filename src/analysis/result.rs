//! Alignment result types

use serde::{Deserialize, Serialize};

use crate::alignment::PathPoint;

/// Notable conditions observed during an alignment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentFlag {
    /// The estimate reached the last reference frame
    ReachedEnd,
    /// The live buffer filled up before the live signal ended
    CapacityExhausted,
    /// The estimate never left the first reference frame
    NeverAdvanced,
}

/// Complete alignment result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Estimated reference position in seconds after each live frame
    ///
    /// Non-decreasing.
    pub positions_seconds: Vec<f64>,

    /// `(estimate, live_index)` for each live frame
    pub path: Vec<PathPoint>,

    /// Run metadata
    pub metadata: AlignmentMetadata,
}

impl AlignmentResult {
    /// Position after the last live frame, if any frame was processed
    pub fn final_position(&self) -> Option<f64> {
        self.positions_seconds.last().copied()
    }

    /// True if `flag` was raised during the run
    pub fn has_flag(&self, flag: AlignmentFlag) -> bool {
        self.metadata.flags.contains(&flag)
    }
}

/// Alignment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentMetadata {
    /// Number of reference chroma frames
    pub reference_frames: usize,

    /// Number of live frames aligned
    pub live_frames: usize,

    /// Analysis sample rate in Hz
    pub sample_rate: u32,

    /// FFT length in samples
    pub n_fft: usize,

    /// Hop length in samples
    pub hop_length: usize,

    /// Reference duration in seconds
    pub reference_duration_seconds: f64,

    /// Live duration in seconds
    pub live_duration_seconds: f64,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Conditions raised during the run
    pub flags: Vec<AlignmentFlag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(positions: Vec<f64>, flags: Vec<AlignmentFlag>) -> AlignmentResult {
        AlignmentResult {
            path: (0..positions.len()).map(|t| PathPoint::new(t, t)).collect(),
            positions_seconds: positions,
            metadata: AlignmentMetadata {
                reference_frames: 3,
                live_frames: 3,
                sample_rate: 44100,
                n_fft: 8192,
                hop_length: 4096,
                reference_duration_seconds: 0.28,
                live_duration_seconds: 0.28,
                processing_time_ms: 1.0,
                algorithm_version: "test".to_string(),
                flags,
            },
        }
    }

    #[test]
    fn test_final_position() {
        assert_eq!(result(vec![0.0, 0.09, 0.19], vec![]).final_position(), Some(0.19));
        assert_eq!(result(vec![], vec![]).final_position(), None);
    }

    #[test]
    fn test_has_flag() {
        let r = result(vec![0.0], vec![AlignmentFlag::NeverAdvanced]);
        assert!(r.has_flag(AlignmentFlag::NeverAdvanced));
        assert!(!r.has_flag(AlignmentFlag::ReachedEnd));
    }
}
