//! Configuration types for PPM decoding.

use serde::{Deserialize, Serialize};

use crate::decode::BASE_SAMPLE_RATE;

fn default_strict_length() -> bool {
    true
}

fn default_parallel() -> bool {
    true
}

fn default_bgm_speed_multiplier() -> f32 {
    1.0
}

fn default_sample_rate() -> u32 {
    BASE_SAMPLE_RATE
}

/// Options controlling how a container is validated and decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Require the header's declared length to equal the buffer length.
    /// When false, trailing or missing signature bytes are tolerated.
    #[serde(default = "default_strict_length")]
    pub strict_length: bool,
    /// Decode independent frame chains and audio tracks on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Extra factor applied to the BGM sample rate (1.0 = as authored).
    #[serde(default = "default_bgm_speed_multiplier")]
    pub bgm_speed_multiplier: f32,
    /// Sample rate of the effect tracks and the base for the BGM rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_length: default_strict_length(),
            parallel: default_parallel(),
            bgm_speed_multiplier: default_bgm_speed_multiplier(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl DecodeOptions {
    /// Validate option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bgm_speed_multiplier.is_finite() || self.bgm_speed_multiplier <= 0.0 {
            return Err(ConfigError::InvalidSpeedMultiplier(self.bgm_speed_multiplier));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        Ok(())
    }
}

/// Option validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BGM speed multiplier must be finite and positive, got {0}")]
    InvalidSpeedMultiplier(f32),
    #[error("Sample rate must be non-zero")]
    InvalidSampleRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        let options = DecodeOptions::default();
        assert!(options.validate().is_ok());
        assert!(options.strict_length);
        assert_eq!(options.sample_rate, 8192);
    }

    #[test]
    fn test_invalid_options() {
        let options = DecodeOptions {
            bgm_speed_multiplier: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidSpeedMultiplier(_))
        ));

        let options = DecodeOptions {
            bgm_speed_multiplier: f32::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DecodeOptions {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(ConfigError::InvalidSampleRate)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: DecodeOptions =
            serde_json::from_str(r#"{ "bgm_speed_multiplier": 1.5 }"#).unwrap();
        assert_eq!(options.bgm_speed_multiplier, 1.5);
        assert!(options.parallel);
        assert!(options.strict_length);

        let json = serde_json::to_string(&options).unwrap();
        let parsed: DecodeOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
