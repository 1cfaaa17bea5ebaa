//! Score weights from TOML (`[scoring]` section)

use super::ConfigValidationError;
use cofounder_domain::ScoreWeights;
use serde::{Deserialize, Serialize};

/// Weights of the three sub-scores in `overall_score`
///
/// # Example
///
/// ```toml
/// [scoring]
/// feasibility = 0.5
/// novelty = 0.25
/// market_signal = 0.25
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScoringConfig {
    pub feasibility: f64,
    pub novelty: f64,
    pub market_signal: f64,
}

impl Default for FileScoringConfig {
    fn default() -> Self {
        let equal = ScoreWeights::EQUAL;
        Self {
            feasibility: equal.feasibility(),
            novelty: equal.novelty(),
            market_signal: equal.market_signal(),
        }
    }
}

impl FileScoringConfig {
    pub fn to_weights(&self) -> Result<ScoreWeights, ConfigValidationError> {
        ScoreWeights::new(self.feasibility, self.novelty, self.market_signal)
            .map_err(|e| ConfigValidationError::InvalidWeights(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.to_weights().map(|_| ())
    }
}
