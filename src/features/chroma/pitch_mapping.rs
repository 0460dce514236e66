//! Frequency to MIDI pitch energy mapping
//!
//! Builds a `128 x num_bins` matrix that redistributes the energy of each
//! FFT bin over the MIDI pitches whose band contains the bin frequency.
//!
//! # Algorithm
//!
//! Pitch `p` owns the band between the geometric midpoints to its neighbours,
//! `440 * 2^((p - 69 ± 0.5 + tuning) / 12)`. A bin strictly inside that band
//! receives the value of a 128-point Hann table stretched linearly across the
//! band; bins outside (or on an edge) receive 0. Neighbouring bands touch, so
//! the result is a smooth log-frequency filterbank.

use crate::error::FollowerError;

/// Number of MIDI pitches covered by the mapping
pub const NUM_PITCHES: usize = 128;

/// Length of the Hann table used to shape each pitch band
pub const BAND_TABLE_LEN: usize = 128;

/// Symmetric Hann window of length `n` (`0.5 - 0.5 cos(2πk / (n - 1))`)
pub fn hann_window(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|k| (0.5 - 0.5 * (2.0 * std::f64::consts::PI * k as f64 / denom).cos()) as f32)
        .collect()
}

/// Frequency of a (possibly fractional) MIDI pitch in 12-TET, A4 = 440 Hz
#[inline]
pub fn pitch_to_hz(pitch: f64) -> f64 {
    440.0 * 2f64.powf((pitch - 69.0) / 12.0)
}

/// Pitch energy mapping for one (sample rate, FFT length, tuning) configuration
#[derive(Debug, Clone)]
pub struct PitchMapping {
    /// Row-major `NUM_PITCHES x num_bins` weights
    weights: Vec<f32>,
    num_bins: usize,
}

impl PitchMapping {
    /// Build the mapping
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `fft_len` - FFT length in samples
    /// * `tuning` - Tuning offset in semitones (0.0 for A4 = 440 Hz)
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::InvalidConfig` if `sample_rate` or `fft_len` is 0
    /// or `tuning` is not finite.
    pub fn build(sample_rate: u32, fft_len: usize, tuning: f32) -> Result<Self, FollowerError> {
        if sample_rate == 0 {
            return Err(FollowerError::InvalidConfig(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        if fft_len == 0 {
            return Err(FollowerError::InvalidConfig(
                "Invalid FFT length: 0".to_string(),
            ));
        }
        if !tuning.is_finite() {
            return Err(FollowerError::InvalidConfig(format!(
                "Tuning offset must be finite, got {}",
                tuning
            )));
        }

        let num_bins = fft_len / 2 + 1;
        let bin_hz = sample_rate as f64 / fft_len as f64;
        let table = hann_window(BAND_TABLE_LEN);
        let tuning = tuning as f64;

        let mut weights = vec![0.0f32; NUM_PITCHES * num_bins];
        for pitch in 0..NUM_PITCHES {
            let lower = pitch_to_hz(pitch as f64 - 0.5 + tuning);
            let upper = pitch_to_hz(pitch as f64 + 0.5 + tuning);
            let row = &mut weights[pitch * num_bins..(pitch + 1) * num_bins];

            // Only bins strictly inside (lower, upper) can be non-zero
            let first = (lower / bin_hz).floor().max(0.0) as usize;
            let last = ((upper / bin_hz).ceil() as usize).min(num_bins.saturating_sub(1));
            for bin in first..=last {
                let freq = bin as f64 * bin_hz;
                row[bin] = band_weight(&table, lower, upper, freq);
            }
        }

        log::debug!(
            "Built pitch mapping: {} pitches x {} bins ({} Hz, fft_len={}, tuning={:.2})",
            NUM_PITCHES,
            num_bins,
            sample_rate,
            fft_len,
            tuning
        );

        Ok(Self { weights, num_bins })
    }

    /// Number of FFT bins per row (`fft_len / 2 + 1`)
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Weights for one MIDI pitch
    pub fn row(&self, pitch: usize) -> &[f32] {
        &self.weights[pitch * self.num_bins..(pitch + 1) * self.num_bins]
    }

    /// Fold the 128 pitch rows into 12 pitch-class rows (`pitch mod 12`)
    ///
    /// Returns a row-major `12 x num_bins` matrix.
    pub fn fold_octaves(&self) -> Vec<f32> {
        let mut folded = vec![0.0f32; super::CHROMA_BINS * self.num_bins];
        for pitch in 0..NUM_PITCHES {
            let class = pitch % super::CHROMA_BINS;
            let dst = &mut folded[class * self.num_bins..(class + 1) * self.num_bins];
            for (d, &w) in dst.iter_mut().zip(self.row(pitch)) {
                *d += w;
            }
        }
        folded
    }
}

/// Hann table value at `freq`'s fractional position inside `(lower, upper)`
fn band_weight(table: &[f32], lower: f64, upper: f64, freq: f64) -> f32 {
    if freq <= lower || freq >= upper {
        return 0.0;
    }
    let last = (table.len() - 1) as f64;
    let pos = (freq - lower) / (upper - lower) * last;
    let idx = (pos.floor() as usize).min(table.len() - 2);
    let frac = (pos - idx as f64) as f32;
    table[idx] * (1.0 - frac) + table[idx + 1] * frac
}
