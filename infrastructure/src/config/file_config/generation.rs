//! Generation settings from TOML (`[generation]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};

/// Sampling and pipeline limits
///
/// # Example
///
/// ```toml
/// [generation]
/// temperature = 0.7
/// max_tokens = 4000
/// timeout_seconds = 60
/// max_concurrent_chains = 4
/// default_num_ideas = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound for one model call
    pub timeout_seconds: u64,
    /// Idea chains allowed to run at once within one generation
    pub max_concurrent_chains: usize,
    pub default_num_ideas: usize,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
            timeout_seconds: 60,
            max_concurrent_chains: 4,
            default_num_ideas: 3,
        }
    }
}

impl FileGenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(ConfigValidationError::InvalidMaxTokens);
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.max_concurrent_chains == 0 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if !(1..=10).contains(&self.default_num_ideas) {
            return Err(ConfigValidationError::InvalidDefaultNumIdeas(
                self.default_num_ideas,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FileGenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base = FileGenerationConfig::default();
        let cases = [
            (
                FileGenerationConfig { temperature: 2.5, ..base.clone() },
                ConfigValidationError::InvalidTemperature(2.5),
            ),
            (
                FileGenerationConfig { max_tokens: 0, ..base.clone() },
                ConfigValidationError::InvalidMaxTokens,
            ),
            (
                FileGenerationConfig { timeout_seconds: 0, ..base.clone() },
                ConfigValidationError::InvalidTimeout,
            ),
            (
                FileGenerationConfig { max_concurrent_chains: 0, ..base.clone() },
                ConfigValidationError::InvalidConcurrency,
            ),
            (
                FileGenerationConfig { default_num_ideas: 11, ..base.clone() },
                ConfigValidationError::InvalidDefaultNumIdeas(11),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }
}
