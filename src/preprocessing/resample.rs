//! Sample rate conversion using rubato
//!
//! Offline sinc resampling of a complete mono signal. `SincFixedIn` starts
//! interpolating half a sinc length before the first input sample, so sample 0
//! of the output already lines up with sample 0 of the input; the filter tail
//! is flushed until the expected length is reached.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::FollowerError;

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;

/// Resample a mono signal from `from_rate` to `to_rate`
///
/// Returns the input unchanged when both rates are equal.
///
/// # Errors
///
/// Returns `FollowerError::InvalidInput` for a zero rate and
/// `FollowerError::ProcessingError` if rubato fails.
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, FollowerError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(FollowerError::InvalidInput(format!(
            "Invalid sample rates: {} -> {}",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        from_rate,
        to_rate
    );

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| FollowerError::ProcessingError(format!("Cannot create resampler: {}", e)))?;

    let expected = (samples.len() as f64 * ratio).round() as usize;
    let mut output: Vec<f32> = Vec::with_capacity(expected + CHUNK_SIZE);

    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let input = [&samples[pos..pos + n]];
        let chunk = resampler
            .process(&input[..], None)
            .map_err(|e| FollowerError::ProcessingError(format!("Resampling failed: {}", e)))?;
        output.extend_from_slice(&chunk[0]);
        pos += n;
    }

    if pos < samples.len() {
        let input = [&samples[pos..]];
        let chunk = resampler
            .process_partial(Some(&input[..]), None)
            .map_err(|e| FollowerError::ProcessingError(format!("Resampling failed: {}", e)))?;
        output.extend_from_slice(&chunk[0]);
    }

    // Flush the filter tail
    while output.len() < expected {
        let chunk = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| FollowerError::ProcessingError(format!("Resampling failed: {}", e)))?;
        if chunk[0].is_empty() {
            break;
        }
        output.extend_from_slice(&chunk[0]);
    }

    output.truncate(expected);
    Ok(output)
}
