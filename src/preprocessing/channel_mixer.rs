//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::FollowerError;

/// Average interleaved channels into a mono signal
///
/// # Arguments
///
/// * `samples` - Interleaved samples (`frame0_ch0, frame0_ch1, ...`)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// Mono samples, one per frame. A trailing partial frame is dropped.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Result<Vec<f32>, FollowerError> {
    if channels == 0 {
        return Err(FollowerError::InvalidInput(
            "Channel count must be at least 1".to_string(),
        ));
    }
    if channels == 1 {
        return Ok(samples.to_vec());
    }

    if samples.len() % channels != 0 {
        log::warn!(
            "Dropping {} trailing samples of a partial {}-channel frame",
            samples.len() % channels,
            channels
        );
    }

    log::debug!("Downmixing {} channels to mono", channels);

    let scale = 1.0 / channels as f32;
    Ok(samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}
