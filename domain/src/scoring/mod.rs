//! Idea scoring rule.
//!
//! Three independent sub-scores in `[0, 1]` are combined into an overall
//! score by a fixed weighted average. The weights are a policy constant and
//! must stay identical across generation and iteration so that scores remain
//! comparable over a record's version history.
//!
//! | Constant | Value |
//! |----------|-------|
//! | Weights (feasibility / novelty / market signal) | 1/3 each |
//! | Interim scores before scoring runs | 0.7 / 0.8 / 0.6 |
//! | Fallback sub-score when evaluation fails | 0.5 |

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Sub-score used for every dimension when the evaluation call fails.
pub const FALLBACK_SUB_SCORE: f64 = 0.5;

/// Interim sub-scores assigned right after generation.
pub const INTERIM_FEASIBILITY: f64 = 0.7;
pub const INTERIM_NOVELTY: f64 = 0.8;
pub const INTERIM_MARKET_SIGNAL: f64 = 0.6;

/// Non-negative weights summing to 1.
///
/// Fields are private so every instance has passed [`ScoreWeights::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    feasibility: f64,
    novelty: f64,
    market_signal: f64,
}

impl ScoreWeights {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn new(feasibility: f64, novelty: f64, market_signal: f64) -> Result<Self, DomainError> {
        let parts = [feasibility, novelty, market_signal];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DomainError::InvalidWeights(
                "weights must be finite and non-negative".into(),
            ));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(DomainError::InvalidWeights(format!(
                "weights must sum to 1, got {sum}"
            )));
        }
        Ok(Self {
            feasibility,
            novelty,
            market_signal,
        })
    }

    pub fn feasibility(&self) -> f64 {
        self.feasibility
    }

    pub fn novelty(&self) -> f64 {
        self.novelty
    }

    pub fn market_signal(&self) -> f64 {
        self.market_signal
    }

    /// Equal weighting of the three dimensions
    pub const EQUAL: ScoreWeights = ScoreWeights {
        feasibility: 1.0 / 3.0,
        novelty: 1.0 / 3.0,
        market_signal: 1.0 / 3.0,
    };

    /// Weighted average of the three sub-scores
    pub fn combine(&self, feasibility: f64, novelty: f64, market_signal: f64) -> f64 {
        let overall = feasibility * self.feasibility
            + novelty * self.novelty
            + market_signal * self.market_signal;
        overall.clamp(0.0, 1.0)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::EQUAL
    }
}

/// A complete score set for one idea (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub feasibility: f64,
    pub novelty: f64,
    pub market_signal: f64,
    pub overall: f64,
}

impl Scores {
    /// Build a score set, normalising sub-scores and deriving the overall score
    pub fn from_sub_scores(
        feasibility: f64,
        novelty: f64,
        market_signal: f64,
        weights: &ScoreWeights,
    ) -> Self {
        let feasibility = normalize_sub_score(feasibility);
        let novelty = normalize_sub_score(novelty);
        let market_signal = normalize_sub_score(market_signal);
        Self {
            feasibility,
            novelty,
            market_signal,
            overall: weights.combine(feasibility, novelty, market_signal),
        }
    }

    /// Scores assigned immediately after generation, before the scorer runs
    pub fn interim(weights: &ScoreWeights) -> Self {
        Self::from_sub_scores(
            INTERIM_FEASIBILITY,
            INTERIM_NOVELTY,
            INTERIM_MARKET_SIGNAL,
            weights,
        )
    }

    /// Scores used when the evaluation call fails
    pub fn fallback(weights: &ScoreWeights) -> Self {
        Self::from_sub_scores(
            FALLBACK_SUB_SCORE,
            FALLBACK_SUB_SCORE,
            FALLBACK_SUB_SCORE,
            weights,
        )
    }

    /// Whether `overall` matches the weighted combination of the sub-scores
    pub fn is_consistent(&self, weights: &ScoreWeights) -> bool {
        let expected = weights.combine(self.feasibility, self.novelty, self.market_signal);
        (expected - self.overall).abs() < 1e-9
    }
}

/// Map a raw model score onto `[0, 1]`.
///
/// Values in `(1, 10]` are read as a 0-10 scale; anything else is clamped.
/// NaN maps to the fallback score.
pub fn normalize_sub_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return FALLBACK_SUB_SCORE;
    }
    if raw > 1.0 && raw <= 10.0 {
        return raw / 10.0;
    }
    raw.clamp(0.0, 1.0)
}
