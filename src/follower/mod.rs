//! Streaming score follower
//!
//! Wraps the chroma extractor and the online time warping engine: raw live
//! audio goes in, an estimated reference position in seconds comes out.
//!
//! Audio can be fed either as ready-made analysis frames ([`ScoreFollower::step`])
//! or as arbitrary-length capture chunks ([`ScoreFollower::push_samples`]),
//! which are cut into `n_fft` windows every `hop_length` samples.
//!
//! # Example
//!
//! ```
//! use stratum_follow::config::FollowerConfig;
//! use stratum_follow::follower::ScoreFollower;
//!
//! let config = FollowerConfig { n_fft: 4096, hop_length: 4096, ..FollowerConfig::default() };
//! let reference: Vec<f32> = (0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//!
//! let mut follower = ScoreFollower::from_reference_samples(&reference, 44100, config)?;
//! let positions = follower.push_samples(&reference)?;
//! assert_eq!(positions.len(), follower.reference_len());
//! # Ok::<(), stratum_follow::FollowerError>(())
//! ```

pub mod diagnostics;

use std::path::Path;

use crate::alignment::{OnlineTimeWarping, PathPoint};
use crate::config::FollowerConfig;
use crate::error::FollowerError;
use crate::features::chroma::extractor::ChromaExtractor;
use crate::features::chroma::Chromagram;
use crate::io::sample_buffer::SampleBuffer;
use crate::preprocessing::reference::ReferencePreprocessor;

/// One score-following session
#[derive(Debug, Clone)]
pub struct ScoreFollower {
    config: FollowerConfig,
    extractor: ChromaExtractor,
    engine: OnlineTimeWarping,
    buffer: SampleBuffer,
    /// `(estimate, live_index)` after every step
    path: Vec<PathPoint>,
}

impl ScoreFollower {
    /// Start following against a precomputed reference chromagram
    ///
    /// The chromagram must have been built with the same `sample_rate`,
    /// `n_fft`, `hop_length` and `tuning` as `config`.
    ///
    /// # Errors
    ///
    /// - `FollowerError::InvalidConfig` if the configuration is invalid
    /// - `FollowerError::InvalidInput` if the reference is empty
    pub fn new(reference: Chromagram, config: FollowerConfig) -> Result<Self, FollowerError> {
        config.validate()?;
        let extractor = ChromaExtractor::new(config.sample_rate, config.n_fft, config.tuning)?;
        let engine = OnlineTimeWarping::new(reference, config.alignment.clone())?;
        let buffer = SampleBuffer::new(config.n_fft, config.hop_length);

        log::debug!(
            "Score follower ready: {} reference frames ({:.2}s), n_fft={}, hop={}",
            engine.ref_len(),
            config.frames_to_seconds(engine.ref_len()),
            config.n_fft,
            config.hop_length
        );

        Ok(Self {
            config,
            extractor,
            engine,
            buffer,
            path: Vec::new(),
        })
    }

    /// Build the reference chromagram from mono samples and start following
    pub fn from_reference_samples(
        samples: &[f32],
        sample_rate: u32,
        config: FollowerConfig,
    ) -> Result<Self, FollowerError> {
        let reference = ReferencePreprocessor::new(&config)?.process_samples(samples, sample_rate)?;
        Self::new(reference, config)
    }

    /// Decode a reference audio file, build its chromagram and start following
    pub fn from_reference_file<P: AsRef<Path>>(
        path: P,
        config: FollowerConfig,
    ) -> Result<Self, FollowerError> {
        let reference = ReferencePreprocessor::new(&config)?.process_file(path)?;
        Self::new(reference, config)
    }

    /// Process one live analysis frame and return the reference position in seconds
    ///
    /// Frames shorter than `n_fft` are zero-padded. The returned position
    /// never decreases within a session.
    ///
    /// # Errors
    ///
    /// - `FollowerError::LengthMismatch` if the frame is longer than `n_fft`
    /// - `FollowerError::CapacityExceeded` once the live buffer is full
    pub fn step(&mut self, frame: &[f32]) -> Result<f64, FollowerError> {
        let n_fft = self.extractor.n_fft();
        if frame.len() < n_fft {
            log::warn!(
                "Short live frame ({} of {} samples), padding with silence",
                frame.len(),
                n_fft
            );
        }

        let chroma = self.extractor.extract_padded(frame)?;
        let estimate = self.engine.insert(&chroma)?;
        let live_index = self.engine.live_len() - 1;
        self.path.push(PathPoint::new(estimate, live_index));

        Ok(self.config.frames_to_seconds(estimate))
    }

    /// Feed a chunk of live mono samples of any length
    ///
    /// Steps once for every complete window now available and returns the
    /// positions in order. Samples that do not yet fill a window are kept for
    /// the next call.
    ///
    /// # Errors
    ///
    /// Fails with the first error from [`step`](Self::step). Windows stepped
    /// before the failure are already on [`path`](Self::path); the failing
    /// window and everything after it stay buffered.
    pub fn push_samples(&mut self, samples: &[f32]) -> Result<Vec<f64>, FollowerError> {
        self.buffer.push(samples);

        let mut positions = Vec::new();
        while let Some(window) = self.buffer.peek_window().map(<[f32]>::to_vec) {
            positions.push(self.step(&window)?);
            self.buffer.advance();
        }
        Ok(positions)
    }

    /// Flush buffered samples that do not fill a whole window
    ///
    /// The remainder is zero-padded and processed as one last frame. Returns
    /// `None` when nothing was buffered.
    pub fn finish(&mut self) -> Result<Option<f64>, FollowerError> {
        match self.buffer.take_remainder() {
            Some(remainder) => self.step(&remainder).map(Some),
            None => Ok(None),
        }
    }

    /// Position of the alignment cursor in seconds
    ///
    /// Unlike the value returned by [`step`](Self::step) this is not clamped
    /// and tracks the reference row the engine is currently exploring.
    pub fn estimated_time(&self) -> f64 {
        self.config.frames_to_seconds(self.engine.ref_index())
    }

    /// Last position returned by [`step`](Self::step), in seconds
    pub fn position(&self) -> f64 {
        self.config.frames_to_seconds(self.engine.last_estimate())
    }

    /// True while more live frames can be accepted
    pub fn is_active(&self) -> bool {
        !self.engine.is_exhausted()
    }

    /// `(estimate, live_index)` for every processed frame
    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    /// Greedy backtrace of up to `b` reference frames from the current cursor
    ///
    /// Empty before the first frame. See [`diagnostics::backwards_path`].
    pub fn get_backwards_path(&self, b: usize) -> Vec<PathPoint> {
        match self.engine.live_index() {
            Some(live_index) => diagnostics::backwards_path(
                self.engine.cost_matrix(),
                PathPoint::new(self.engine.ref_index(), live_index),
                b,
            ),
            None => Vec::new(),
        }
    }

    /// Points of the forward path that are not on `back_path`
    pub fn get_path_difference(&self, back_path: &[PathPoint]) -> Vec<PathPoint> {
        diagnostics::path_difference(&self.path, back_path)
    }

    /// Number of reference frames
    pub fn reference_len(&self) -> usize {
        self.engine.ref_len()
    }

    /// Reference duration covered by the chromagram, in seconds
    pub fn reference_duration(&self) -> f64 {
        self.config.frames_to_seconds(self.engine.ref_len())
    }

    /// Underlying alignment engine
    pub fn engine(&self) -> &OnlineTimeWarping {
        &self.engine
    }

    /// Session configuration
    pub fn config(&self) -> &FollowerConfig {
        &self.config
    }
}
