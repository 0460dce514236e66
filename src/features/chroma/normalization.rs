//! CENS normalization
//!
//! Turns a raw 12-bin pitch-class energy vector into a CENS feature:
//!
//! 1. L1 normalization (silence becomes a uniform vector)
//! 2. Logarithmic quantization into `{0, 1, 2, 3, 4}`
//! 3. L2 normalization (an all-zero result becomes a uniform vector)
//!
//! Temporal smoothing, the usual fourth CENS stage, is not applied: each
//! live frame must be usable on its own.

use super::{ChromaVector, CHROMA_BINS};

/// Quantization thresholds: a value in `(THRESHOLDS[k], THRESHOLDS[k + 1]]` maps to `k + 1`
pub const QUANTIZATION_THRESHOLDS: [f32; 5] = [0.05, 0.1, 0.2, 0.4, 1.0];

/// Normalize by the L1 norm
///
/// An all-zero vector is replaced by ones before dividing, giving `1/12` per bin.
pub fn l1_normalize(chroma: &mut ChromaVector) {
    let mut length: f32 = chroma.iter().map(|x| x.abs()).sum();
    if length == 0.0 {
        chroma.fill(1.0);
        length = CHROMA_BINS as f32;
    }
    for x in chroma.iter_mut() {
        *x /= length;
    }
}

/// Quantize one L1-normalized value to `{0, 1, 2, 3, 4}`
#[inline]
pub fn quantize_value(value: f32) -> f32 {
    for k in 0..4 {
        if value > QUANTIZATION_THRESHOLDS[k] && value <= QUANTIZATION_THRESHOLDS[k + 1] {
            return (k + 1) as f32;
        }
    }
    0.0
}

/// Quantize every bin in place
pub fn quantize(chroma: &mut ChromaVector) {
    for x in chroma.iter_mut() {
        *x = quantize_value(*x);
    }
}

/// Normalize by the L2 norm
///
/// An all-zero vector is replaced by ones and divided by `sqrt(12)`.
pub fn l2_normalize(chroma: &mut ChromaVector) {
    let mut length = chroma.iter().map(|x| x * x).sum::<f32>().sqrt();
    if length == 0.0 {
        chroma.fill(1.0);
        length = (CHROMA_BINS as f32).sqrt();
    }
    for x in chroma.iter_mut() {
        *x /= length;
    }
}

/// Full CENS pipeline on a raw pitch-class energy vector
pub fn cens(mut chroma: ChromaVector) -> ChromaVector {
    l1_normalize(&mut chroma);
    quantize(&mut chroma);
    l2_normalize(&mut chroma);
    chroma
}
