//! Chroma vector extraction
//!
//! Converts one fixed-length audio frame into a 12-element CENS chroma vector:
//! Hann window → FFT → power spectrum → pitch-class filterbank → CENS.
//!
//! The pitch-class filterbank (pitch mapping folded over octaves) is built
//! once per extractor and reused for every frame.
//!
//! # Example
//!
//! ```
//! use stratum_follow::features::chroma::extractor::ChromaExtractor;
//!
//! let extractor = ChromaExtractor::new(44100, 4096, 0.0)?;
//! let silence = vec![0.0f32; 4096];
//! let chroma = extractor.extract(&silence)?;
//! assert!((chroma[0] - 1.0 / 12f32.sqrt()).abs() < 1e-6);
//! # Ok::<(), stratum_follow::FollowerError>(())
//! ```

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::normalization::cens;
use super::pitch_mapping::{hann_window, PitchMapping};
use super::{ChromaVector, CHROMA_BINS};
use crate::error::FollowerError;

/// Streaming audio-to-CENS converter for one (sample rate, FFT length) pair
#[derive(Clone)]
pub struct ChromaExtractor {
    sample_rate: u32,
    n_fft: usize,
    num_bins: usize,
    window: Vec<f32>,
    /// Row-major `12 x num_bins` pitch-class filterbank
    filterbank: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for ChromaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromaExtractor")
            .field("sample_rate", &self.sample_rate)
            .field("n_fft", &self.n_fft)
            .field("num_bins", &self.num_bins)
            .finish()
    }
}

impl ChromaExtractor {
    /// Create an extractor
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `n_fft` - Frame length and FFT size in samples
    /// * `tuning` - Tuning offset in semitones
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::InvalidConfig` for a zero sample rate or FFT length.
    pub fn new(sample_rate: u32, n_fft: usize, tuning: f32) -> Result<Self, FollowerError> {
        let mapping = PitchMapping::build(sample_rate, n_fft, tuning)?;
        let num_bins = mapping.num_bins();
        let filterbank = mapping.fold_octaves();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);

        log::debug!(
            "Created chroma extractor: {} Hz, n_fft={}, {} bins",
            sample_rate,
            n_fft,
            num_bins
        );

        Ok(Self {
            sample_rate,
            n_fft,
            num_bins,
            window: hann_window(n_fft),
            filterbank,
            fft,
        })
    }

    /// Sample rate this extractor was built for
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Required frame length in samples
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Extract the CENS chroma vector of one frame
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::LengthMismatch` if `frame.len() != n_fft`.
    pub fn extract(&self, frame: &[f32]) -> Result<ChromaVector, FollowerError> {
        if frame.len() != self.n_fft {
            return Err(FollowerError::LengthMismatch {
                expected: self.n_fft,
                actual: frame.len(),
            });
        }

        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(&self.window)
            .map(|(&x, &w)| Complex::new(x * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let power: Vec<f32> = buffer[..self.num_bins].iter().map(|c| c.norm_sqr()).collect();

        let mut chroma = [0.0f32; CHROMA_BINS];
        for (class, value) in chroma.iter_mut().enumerate() {
            let row = &self.filterbank[class * self.num_bins..(class + 1) * self.num_bins];
            *value = row.iter().zip(&power).map(|(w, p)| w * p).sum();
        }

        Ok(cens(chroma))
    }

    /// Extract a frame that may be shorter than `n_fft`, zero-padding the tail
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::LengthMismatch` if the frame is longer than `n_fft`.
    pub fn extract_padded(&self, frame: &[f32]) -> Result<ChromaVector, FollowerError> {
        if frame.len() == self.n_fft {
            return self.extract(frame);
        }
        if frame.len() > self.n_fft {
            return Err(FollowerError::LengthMismatch {
                expected: self.n_fft,
                actual: frame.len(),
            });
        }
        let mut padded = vec![0.0f32; self.n_fft];
        padded[..frame.len()].copy_from_slice(frame);
        self.extract(&padded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    fn l2(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_silence_gives_uniform_vector() {
        let extractor = ChromaExtractor::new(44100, 1024, 0.0).unwrap();
        let chroma = extractor.extract(&vec![0.0; 1024]).unwrap();
        let expected = 1.0 / 12f32.sqrt();
        for &x in &chroma {
            assert!((x - expected).abs() < 1e-6, "Expected {}, got {}", expected, x);
        }
    }

    #[test]
    fn test_a440_peaks_at_pitch_class_a() {
        let extractor = ChromaExtractor::new(44100, 4096, 0.0).unwrap();
        let chroma = extractor.extract(&sine(440.0, 44100, 4096)).unwrap();
        let peak = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 9, "A440 should peak at pitch class A, got {:?}", chroma);
    }

    #[test]
    fn test_middle_c_peaks_at_pitch_class_c() {
        let extractor = ChromaExtractor::new(44100, 8192, 0.0).unwrap();
        let chroma = extractor.extract(&sine(261.63, 44100, 8192)).unwrap();
        let peak = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 0);
    }

    #[test]
    fn test_output_is_unit_norm() {
        let extractor = ChromaExtractor::new(44100, 4096, 0.0).unwrap();
        let mut frame = sine(330.0, 44100, 4096);
        for (i, s) in sine(523.25, 44100, 4096).iter().enumerate() {
            frame[i] += s;
        }
        let chroma = extractor.extract(&frame).unwrap();
        assert!((l2(&chroma) - 1.0).abs() < 1e-5);
        assert!(chroma.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_deterministic() {
        let extractor = ChromaExtractor::new(44100, 2048, 0.0).unwrap();
        let frame = sine(392.0, 44100, 2048);
        let a = extractor.extract(&frame).unwrap();
        let b = extractor.extract(&frame).unwrap();
        assert_eq!(a, b);

        let other = ChromaExtractor::new(44100, 2048, 0.0).unwrap();
        assert_eq!(a, other.extract(&frame).unwrap());
    }

    #[test]
    fn test_length_mismatch() {
        let extractor = ChromaExtractor::new(44100, 1024, 0.0).unwrap();
        let err = extractor.extract(&vec![0.0; 1000]).unwrap_err();
        assert_eq!(
            err,
            FollowerError::LengthMismatch {
                expected: 1024,
                actual: 1000
            }
        );
    }

    #[test]
    fn test_extract_padded() {
        let extractor = ChromaExtractor::new(44100, 1024, 0.0).unwrap();
        let short = sine(440.0, 44100, 600);
        let mut padded = short.clone();
        padded.resize(1024, 0.0);
        assert_eq!(
            extractor.extract_padded(&short).unwrap(),
            extractor.extract(&padded).unwrap()
        );
        assert!(extractor.extract_padded(&vec![0.0; 2000]).is_err());
    }

    #[test]
    fn test_toy_fft_size() {
        let extractor = ChromaExtractor::new(44100, 8, 0.0).unwrap();
        let chroma = extractor.extract(&[0.1, -0.2, 0.3, 0.0, 0.5, -0.1, 0.2, 0.0]).unwrap();
        assert!((l2(&chroma) - 1.0).abs() < 1e-5);
    }
}
