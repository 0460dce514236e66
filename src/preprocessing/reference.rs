//! Reference chromagram preprocessing
//!
//! Turns a complete reference recording into the fixed chromagram the
//! alignment engine follows:
//!
//! 1. Decode (files only) and average channels to mono
//! 2. Resample to the analysis rate if needed
//! 3. Slide an `n_fft` window with step `hop_length` and extract one CENS
//!    vector per window
//!
//! `ref_len = floor((num_samples - n_fft) / hop_length) + 1`.
//!
//! # Example
//!
//! ```
//! use stratum_follow::config::FollowerConfig;
//! use stratum_follow::preprocessing::reference::ReferencePreprocessor;
//!
//! let config = FollowerConfig { n_fft: 4096, hop_length: 4096, ..FollowerConfig::default() };
//! let preprocessor = ReferencePreprocessor::new(&config)?;
//! let samples = vec![0.0f32; 44100];
//! let chromagram = preprocessor.process_samples(&samples, 44100)?;
//! assert_eq!(chromagram.len(), (44100 - 4096) / 4096 + 1);
//! # Ok::<(), stratum_follow::FollowerError>(())
//! ```

use std::path::Path;

use rayon::prelude::*;

use super::channel_mixer::downmix_to_mono;
use super::resample::resample_mono;
use crate::config::FollowerConfig;
use crate::error::FollowerError;
use crate::features::chroma::extractor::ChromaExtractor;
use crate::features::chroma::{ChromaVector, Chromagram};
use crate::io::decoder::decode_audio;

/// Number of analysis frames for a signal of `num_samples`
///
/// Returns 0 when the signal is shorter than one window.
pub fn num_frames(num_samples: usize, n_fft: usize, hop_length: usize) -> usize {
    if num_samples < n_fft || hop_length == 0 {
        0
    } else {
        (num_samples - n_fft) / hop_length + 1
    }
}

/// Builds reference chromagrams with a fixed analysis configuration
#[derive(Debug, Clone)]
pub struct ReferencePreprocessor {
    extractor: ChromaExtractor,
    hop_length: usize,
}

impl ReferencePreprocessor {
    /// Create a preprocessor for the analysis parameters in `config`
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: &FollowerConfig) -> Result<Self, FollowerError> {
        config.validate()?;
        Ok(Self {
            extractor: ChromaExtractor::new(config.sample_rate, config.n_fft, config.tuning)?,
            hop_length: config.hop_length,
        })
    }

    /// Analysis sample rate
    pub fn sample_rate(&self) -> u32 {
        self.extractor.sample_rate()
    }

    /// Decode a reference file and build its chromagram
    ///
    /// # Errors
    ///
    /// - `FollowerError::DecodingError` if the file cannot be decoded
    /// - `FollowerError::ProcessingError` if the audio is shorter than one window
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Chromagram, FollowerError> {
        let audio = decode_audio(path)?;
        self.process_interleaved(&audio.samples, audio.channels, audio.sample_rate)
    }

    /// Build a chromagram from interleaved multi-channel samples
    pub fn process_interleaved(
        &self,
        samples: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<Chromagram, FollowerError> {
        let mono = downmix_to_mono(samples, channels)?;
        self.process_samples(&mono, sample_rate)
    }

    /// Build a chromagram from mono samples at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns `FollowerError::ProcessingError` if the (resampled) signal is
    /// shorter than `n_fft`.
    pub fn process_samples(&self, samples: &[f32], sample_rate: u32) -> Result<Chromagram, FollowerError> {
        let target_rate = self.extractor.sample_rate();
        let n_fft = self.extractor.n_fft();

        let resampled;
        let samples = if sample_rate != target_rate {
            log::warn!(
                "Reference is {} Hz, resampling to analysis rate {} Hz",
                sample_rate,
                target_rate
            );
            resampled = resample_mono(samples, sample_rate, target_rate)?;
            &resampled[..]
        } else {
            samples
        };

        let frames = num_frames(samples.len(), n_fft, self.hop_length);
        if frames == 0 {
            return Err(FollowerError::ProcessingError(format!(
                "Reference audio too short: {} samples, need at least {}",
                samples.len(),
                n_fft
            )));
        }

        let columns: Vec<ChromaVector> = (0..frames)
            .into_par_iter()
            .map(|m| {
                let start = m * self.hop_length;
                self.extractor.extract(&samples[start..start + n_fft])
            })
            .collect::<Result<_, _>>()?;

        log::debug!(
            "Reference chromagram: {} frames ({:.2}s at {} Hz, n_fft={}, hop={})",
            frames,
            samples.len() as f64 / target_rate as f64,
            target_rate,
            n_fft,
            self.hop_length
        );

        Ok(Chromagram::from_columns(&columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n_fft: usize, hop_length: usize) -> FollowerConfig {
        FollowerConfig {
            n_fft,
            hop_length,
            ..FollowerConfig::default()
        }
    }

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_num_frames() {
        assert_eq!(num_frames(44100, 4096, 4096), 10);
        assert_eq!(num_frames(4096, 4096, 512), 1);
        assert_eq!(num_frames(4095, 4096, 512), 0);
        assert_eq!(num_frames(8192, 4096, 2048), 3);
    }

    #[test]
    fn test_frame_count_and_rows() {
        let preprocessor = ReferencePreprocessor::new(&config(4096, 4096)).unwrap();
        let gram = preprocessor
            .process_samples(&sine(440.0, 44100, 44100), 44100)
            .unwrap();
        assert_eq!(gram.len(), (44100 - 4096) / 4096 + 1);
        assert_eq!(gram.num_rows(), 12);
    }

    #[test]
    fn test_columns_match_extractor() {
        let cfg = config(2048, 1024);
        let preprocessor = ReferencePreprocessor::new(&cfg).unwrap();
        let samples = sine(523.25, 44100, 8000);
        let gram = preprocessor.process_samples(&samples, 44100).unwrap();

        let extractor = ChromaExtractor::new(44100, 2048, 0.0).unwrap();
        for m in 0..gram.len() {
            let expected = extractor.extract(&samples[m * 1024..m * 1024 + 2048]).unwrap();
            assert_eq!(gram.column(m), &expected[..]);
        }
    }

    #[test]
    fn test_idempotent() {
        let preprocessor = ReferencePreprocessor::new(&config(2048, 512)).unwrap();
        let samples = sine(330.0, 44100, 20000);
        let a = preprocessor.process_samples(&samples, 44100).unwrap();
        let b = preprocessor.process_samples(&samples, 44100).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_short() {
        let preprocessor = ReferencePreprocessor::new(&config(4096, 1024)).unwrap();
        let result = preprocessor.process_samples(&vec![0.0; 4000], 44100);
        assert!(matches!(result, Err(FollowerError::ProcessingError(_))));
    }

    #[test]
    fn test_stereo_input() {
        let preprocessor = ReferencePreprocessor::new(&config(2048, 2048)).unwrap();
        let mono = sine(440.0, 44100, 8192);
        let interleaved: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();
        let from_stereo = preprocessor.process_interleaved(&interleaved, 2, 44100).unwrap();
        let from_mono = preprocessor.process_samples(&mono, 44100).unwrap();
        assert_eq!(from_stereo, from_mono);
    }

    #[test]
    fn test_resamples_other_rates() {
        let preprocessor = ReferencePreprocessor::new(&config(2048, 2048)).unwrap();
        let gram = preprocessor
            .process_samples(&sine(440.0, 22050, 22050), 22050)
            .unwrap();
        assert_eq!(preprocessor.sample_rate(), 44100);
        // One second at 44.1 kHz after resampling
        assert_eq!(gram.len(), (44100 - 2048) / 2048 + 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(ReferencePreprocessor::new(&config(0, 512)).is_err());
        assert!(ReferencePreprocessor::new(&config(1024, 0)).is_err());
    }
}
