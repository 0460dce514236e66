//! Chroma extraction modules
//!
//! Convert fixed-length audio frames to 12-element CENS chroma vectors:
//! - Frequency to MIDI pitch energy mapping
//! - Windowed FFT and octave folding
//! - CENS quantization and normalization
//!
//! Chromagrams are stored column-major: one contiguous run of
//! [`CHROMA_BINS`] values per analysis frame.

pub mod extractor;
pub mod normalization;
pub mod pitch_mapping;

use serde::{Deserialize, Serialize};

use crate::error::FollowerError;

/// Number of pitch classes (C, C#, ..., B)
pub const CHROMA_BINS: usize = 12;

/// One chroma feature vector, indexed by pitch class (0 = C)
pub type ChromaVector = [f32; CHROMA_BINS];

/// Sequence of chroma vectors (12 rows x `len()` columns)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chromagram {
    data: Vec<f32>,
}

impl Chromagram {
    /// Create an empty chromagram
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create an empty chromagram with room for `frames` columns
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            data: Vec::with_capacity(frames * CHROMA_BINS),
        }
    }

    /// Build from a list of chroma vectors (one per frame)
    pub fn from_columns(columns: &[ChromaVector]) -> Self {
        let mut gram = Self::with_capacity(columns.len());
        for column in columns {
            gram.push(column);
        }
        gram
    }

    /// Check the storage holds whole columns of finite values
    ///
    /// Chromagrams built through [`push`](Self::push) always pass; this
    /// guards ones that arrive through deserialization.
    pub fn validate(&self) -> Result<(), FollowerError> {
        if self.data.len() % CHROMA_BINS != 0 {
            return Err(FollowerError::InvalidInput(format!(
                "Chromagram holds {} values, not a multiple of {}",
                self.data.len(),
                CHROMA_BINS
            )));
        }
        if let Some(frame) = self
            .columns()
            .position(|column| column.iter().any(|x| !x.is_finite()))
        {
            return Err(FollowerError::InvalidInput(format!(
                "Chroma vector at frame {} contains non-finite values",
                frame
            )));
        }
        Ok(())
    }

    /// Append one column
    pub fn push(&mut self, column: &ChromaVector) {
        self.data.extend_from_slice(column);
    }

    /// Number of rows (always 12)
    pub fn num_rows(&self) -> usize {
        CHROMA_BINS
    }

    /// Number of frames (columns)
    pub fn len(&self) -> usize {
        self.data.len() / CHROMA_BINS
    }

    /// True when no frames are stored
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Column `index` as a 12-element slice
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn column(&self, index: usize) -> &[f32] {
        &self.data[index * CHROMA_BINS..(index + 1) * CHROMA_BINS]
    }

    /// Iterate over columns in frame order
    pub fn columns(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(CHROMA_BINS)
    }

    /// Single value at (pitch class, frame)
    pub fn get(&self, pitch_class: usize, frame: usize) -> Option<f32> {
        if pitch_class >= CHROMA_BINS || frame >= self.len() {
            return None;
        }
        Some(self.data[frame * CHROMA_BINS + pitch_class])
    }
}

/// Dot product of two chroma columns
#[inline]
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
