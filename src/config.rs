//! Configuration parameters for score following

use crate::error::FollowerError;

/// How `diag_weight` enters the accumulated cost recurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalWeighting {
    /// `cost(i,j) = local + min(diag_weight * cost(i-1,j-1), cost(i-1,j), cost(i,j-1))`
    AccumulatedCost,
    /// `cost(i,j) = min(cost(i-1,j-1) + diag_weight * local, cost(i-1,j) + local, cost(i,j-1) + local)`
    LocalCost,
}

/// Online time warping parameters
#[derive(Debug, Clone)]
pub struct AlignmentConfig {
    /// Search window `c`: number of reference frames (and live frames) behind
    /// the cursor whose costs are updated on each step (default: 10)
    pub window: usize,

    /// Slope constraint: maximum consecutive REF or LIVE decisions before a
    /// forced alternation (default: 3)
    pub max_run_count: usize,

    /// Diagonal step multiplier; values below 1 favor tempo-matched progress (default: 0.4)
    pub diag_weight: f32,

    /// Where the diagonal weight is applied (default: AccumulatedCost)
    pub diagonal_weighting: DiagonalWeighting,

    /// Live buffer capacity as a multiple of the reference length (default: Some(4)).
    /// `None` lets the live and cost buffers grow without bound.
    pub capacity_factor: Option<usize>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            window: 10,
            max_run_count: 3,
            diag_weight: 0.4,
            diagonal_weighting: DiagonalWeighting::AccumulatedCost,
            capacity_factor: Some(4),
        }
    }
}

impl AlignmentConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), FollowerError> {
        if self.window == 0 {
            return Err(FollowerError::InvalidConfig(
                "Search window must be at least 1".to_string(),
            ));
        }
        if self.max_run_count == 0 {
            return Err(FollowerError::InvalidConfig(
                "max_run_count must be at least 1".to_string(),
            ));
        }
        if !self.diag_weight.is_finite() || self.diag_weight <= 0.0 {
            return Err(FollowerError::InvalidConfig(format!(
                "diag_weight must be finite and positive, got {}",
                self.diag_weight
            )));
        }
        if self.capacity_factor == Some(0) {
            return Err(FollowerError::InvalidConfig(
                "capacity_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Score follower configuration
///
/// The extractor and the reference preprocessor must share `sample_rate`,
/// `n_fft` and `hop_length` within one session; keeping them in a single
/// struct enforces that.
#[derive(Debug, Clone)]
pub struct FollowerConfig {
    /// Analysis sample rate in Hz (default: 44100)
    pub sample_rate: u32,

    /// FFT length in samples, also the analysis frame length (default: 8192)
    pub n_fft: usize,

    /// Hop between successive analysis frames in samples (default: 4096)
    pub hop_length: usize,

    /// Tuning offset in semitones applied to the pitch mapping (default: 0.0)
    pub tuning: f32,

    /// Online time warping parameters
    pub alignment: AlignmentConfig,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            n_fft: 8192,
            hop_length: 4096,
            tuning: 0.0,
            alignment: AlignmentConfig::default(),
        }
    }
}

impl FollowerConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), FollowerError> {
        if self.sample_rate == 0 {
            return Err(FollowerError::InvalidConfig(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        if self.n_fft == 0 {
            return Err(FollowerError::InvalidConfig(
                "Invalid FFT length: 0".to_string(),
            ));
        }
        if self.hop_length == 0 {
            return Err(FollowerError::InvalidConfig(
                "Invalid hop length: 0".to_string(),
            ));
        }
        if !self.tuning.is_finite() {
            return Err(FollowerError::InvalidConfig(format!(
                "Tuning offset must be finite, got {}",
                self.tuning
            )));
        }
        self.alignment.validate()
    }

    /// Convert a reference frame index to seconds
    pub fn frames_to_seconds(&self, frame: usize) -> f64 {
        frame as f64 * self.hop_length as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FollowerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alignment.window, 10);
        assert_eq!(config.alignment.max_run_count, 3);
        assert!((config.alignment.diag_weight - 0.4).abs() < 1e-6);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.n_fft, 8192);
    }

    #[test]
    fn test_rejects_zero_parameters() {
        let mut config = FollowerConfig::default();
        config.sample_rate = 0;
        assert!(matches!(config.validate(), Err(FollowerError::InvalidConfig(_))));

        let mut config = FollowerConfig::default();
        config.n_fft = 0;
        assert!(config.validate().is_err());

        let mut config = FollowerConfig::default();
        config.hop_length = 0;
        assert!(config.validate().is_err());

        let mut config = FollowerConfig::default();
        config.alignment.window = 0;
        assert!(config.validate().is_err());

        let mut config = FollowerConfig::default();
        config.alignment.max_run_count = 0;
        assert!(config.validate().is_err());

        let mut config = FollowerConfig::default();
        config.alignment.capacity_factor = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_diag_weight() {
        let mut config = AlignmentConfig::default();
        config.diag_weight = 0.0;
        assert!(config.validate().is_err());
        config.diag_weight = f32::NAN;
        assert!(config.validate().is_err());
        config.diag_weight = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frames_to_seconds() {
        let config = FollowerConfig {
            hop_length: 4410,
            ..FollowerConfig::default()
        };
        assert!((config.frames_to_seconds(10) - 1.0).abs() < 1e-12);
        assert_eq!(config.frames_to_seconds(0), 0.0);
    }
}
