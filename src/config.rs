//! Voice construction settings, validated before anything touches the audio thread.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default oscillator seeds. The two must differ so each unit gets its own calibration.
pub const DEFAULT_SEED_A: u32 = 1_234_567;
pub const DEFAULT_SEED_B: u32 = 9_876_543;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),
    #[error("block size hint must be between 1 and {max}, got {got}")]
    InvalidBlockSize { got: usize, max: usize },
    #[error("filter smoothing time must be non-negative and finite, got {0} ms")]
    InvalidSmoothingTime(f32),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub sample_rate: f32,
    pub block_size_hint: usize,
    /// One-pole smoothing time for filter cutoff, resonance and drive.
    pub filter_smoothing_ms: f32,
    pub seed_a: u32,
    pub seed_b: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size_hint: 512,
            filter_smoothing_ms: 5.0,
            seed_a: DEFAULT_SEED_A,
            seed_b: DEFAULT_SEED_B,
        }
    }
}

impl VoiceConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_seeds(mut self, seed_a: u32, seed_b: u32) -> Self {
        self.seed_a = seed_a;
        self.seed_b = seed_b;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size_hint == 0 || self.block_size_hint > crate::MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                got: self.block_size_hint,
                max: crate::MAX_BLOCK_SIZE,
            });
        }
        if !(self.filter_smoothing_ms.is_finite() && self.filter_smoothing_ms >= 0.0) {
            return Err(ConfigError::InvalidSmoothingTime(self.filter_smoothing_ms));
        }
        Ok(())
    }
}
