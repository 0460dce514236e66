//! # Stratum Follow
//!
//! A real-time score-following engine: given a reference recording and a
//! live performance of the same piece, it continuously estimates where in
//! the reference the performer currently is.
//!
//! ## Features
//!
//! - **CENS Chroma**: FFT-based pitch-class energy with quantization and normalization
//! - **Online Time Warping**: Windowed incremental DTW with slope constraints (Dixon 2005)
//! - **Streaming Intake**: Arbitrary-length live chunks are cut into analysis windows
//! - **Reference Loading**: Any symphonia-supported file, downmixed and resampled
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_follow::{ScoreFollower, FollowerConfig};
//!
//! let config = FollowerConfig::default();
//! let mut follower = ScoreFollower::from_reference_file("reference.wav", config)?;
//!
//! // Feed live audio as it arrives
//! let chunk = vec![0.0f32; 2048];
//! for position in follower.push_samples(&chunk)? {
//!     println!("Reference position: {:.2}s", position);
//! }
//! # Ok::<(), stratum_follow::FollowerError>(())
//! ```
//!
//! ## Architecture
//!
//! The following pipeline flows like this:
//!
//! ```text
//! Reference Audio → Preprocessing → Reference Chromagram ─┐
//!                                                         ├→ Online Time Warping → Position
//! Live Audio → Sample Buffer → Chroma Extractor ──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alignment;
pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod follower;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use alignment::{OnlineTimeWarping, PathPoint, Step};
pub use analysis::result::{AlignmentFlag, AlignmentMetadata, AlignmentResult};
pub use config::{AlignmentConfig, DiagonalWeighting, FollowerConfig};
pub use error::FollowerError;
pub use features::chroma::extractor::ChromaExtractor;
pub use features::chroma::{ChromaVector, Chromagram};
pub use follower::ScoreFollower;
pub use preprocessing::reference::ReferencePreprocessor;

/// Offline alignment of a complete live recording against a reference
///
/// Builds the reference chromagram, then streams the live signal through a
/// [`ScoreFollower`] one hop at a time, exactly as a capture callback would.
/// A trailing live segment shorter than one window is dropped, matching how
/// the reference is framed; a live signal shorter than one window is
/// zero-padded into a single frame.
///
/// # Arguments
///
/// * `reference` - Mono reference samples
/// * `live` - Mono live samples
/// * `sample_rate` - Sample rate of both signals in Hz; resampled to
///   `config.sample_rate` when different
/// * `config` - Follower configuration
///
/// # Returns
///
/// `AlignmentResult` with one reference position per live frame, the
/// alignment path and run metadata. Running out of live capacity ends the
/// run early and raises [`AlignmentFlag::CapacityExhausted`].
///
/// # Errors
///
/// Returns `FollowerError` for empty input, an invalid configuration, or a
/// reference shorter than one analysis window.
///
/// # Example
///
/// ```
/// use stratum_follow::{align_audio, FollowerConfig};
///
/// let samples: Vec<f32> = (0..44100)
///     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
///     .collect();
/// let config = FollowerConfig { n_fft: 4096, hop_length: 4096, ..FollowerConfig::default() };
///
/// let result = align_audio(&samples, &samples, 44100, config)?;
/// assert_eq!(result.metadata.live_frames, result.metadata.reference_frames);
/// # Ok::<(), stratum_follow::FollowerError>(())
/// ```
pub fn align_audio(
    reference: &[f32],
    live: &[f32],
    sample_rate: u32,
    config: FollowerConfig,
) -> Result<AlignmentResult, FollowerError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting alignment: {} reference samples, {} live samples at {} Hz",
        reference.len(),
        live.len(),
        sample_rate
    );

    if reference.is_empty() {
        return Err(FollowerError::InvalidInput("Empty reference samples".to_string()));
    }
    if live.is_empty() {
        return Err(FollowerError::InvalidInput("Empty live samples".to_string()));
    }
    if sample_rate == 0 {
        return Err(FollowerError::InvalidInput("Invalid sample rate".to_string()));
    }

    let mut follower = ScoreFollower::from_reference_samples(reference, sample_rate, config.clone())?;

    let resampled;
    let live = if sample_rate != config.sample_rate {
        resampled = preprocessing::resample::resample_mono(live, sample_rate, config.sample_rate)?;
        &resampled[..]
    } else {
        live
    };

    let mut flags = Vec::new();
    for chunk in live.chunks(config.hop_length) {
        match follower.push_samples(chunk) {
            Ok(_) => {}
            Err(FollowerError::CapacityExceeded { capacity }) => {
                log::warn!(
                    "Live capacity of {} frames exhausted, stopping alignment early",
                    capacity
                );
                flags.push(AlignmentFlag::CapacityExhausted);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    if follower.path().is_empty() {
        follower.finish()?;
    }

    let path = follower.path().to_vec();
    let positions_seconds: Vec<f64> = path
        .iter()
        .map(|p| config.frames_to_seconds(p.ref_index))
        .collect();

    let reference_frames = follower.reference_len();
    let last_estimate = follower.engine().last_estimate();
    if last_estimate + 1 == reference_frames {
        flags.push(AlignmentFlag::ReachedEnd);
    } else if last_estimate == 0 {
        flags.push(AlignmentFlag::NeverAdvanced);
    }

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Alignment finished: {} live frames, final position {:.2}s of {:.2}s in {:.1} ms",
        path.len(),
        follower.position(),
        follower.reference_duration(),
        processing_time_ms
    );

    Ok(AlignmentResult {
        positions_seconds,
        metadata: AlignmentMetadata {
            reference_frames,
            live_frames: path.len(),
            sample_rate: config.sample_rate,
            n_fft: config.n_fft,
            hop_length: config.hop_length,
            reference_duration_seconds: follower.reference_duration(),
            live_duration_seconds: live.len() as f64 / config.sample_rate as f64,
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            flags,
        },
        path,
    })
}
