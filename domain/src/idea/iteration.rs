//! Iteration types - which single stage an iteration re-runs.

use crate::core::error::DomainError;
use crate::stage::AgentRole;
use serde::{Deserialize, Serialize};

/// Targeted re-run of exactly one stage against an existing record.
///
/// Dependent stages are never re-run: a `MarketAnalysis` iteration leaves
/// the synthesis that was built on the previous analysis untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationType {
    Synthesis,
    Refinement,
    Critique,
    MarketAnalysis,
}

impl IterationType {
    pub const ALL: [IterationType; 4] = [
        IterationType::Synthesis,
        IterationType::Refinement,
        IterationType::Critique,
        IterationType::MarketAnalysis,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IterationType::Synthesis => "synthesis",
            IterationType::Refinement => "refinement",
            IterationType::Critique => "critique",
            IterationType::MarketAnalysis => "market_analysis",
        }
    }

    /// The stage this iteration dispatches to
    pub fn stage(&self) -> AgentRole {
        match self {
            IterationType::Synthesis => AgentRole::Synthesizer,
            IterationType::Refinement => AgentRole::Refiner,
            IterationType::Critique => AgentRole::Critic,
            IterationType::MarketAnalysis => AgentRole::MarketAnalyst,
        }
    }
}

impl std::fmt::Display for IterationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IterationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synthesis" => Ok(IterationType::Synthesis),
            "refinement" => Ok(IterationType::Refinement),
            "critique" => Ok(IterationType::Critique),
            "market_analysis" => Ok(IterationType::MarketAnalysis),
            _ => Err(DomainError::UnknownIterationType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for ty in IterationType::ALL {
            assert_eq!(ty.as_str().parse::<IterationType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_type() {
        let err = "rewrite".parse::<IterationType>().unwrap_err();
        assert_eq!(err, DomainError::UnknownIterationType("rewrite".into()));
    }

    #[test]
    fn test_dispatch_table() {
        assert_eq!(IterationType::Synthesis.stage(), AgentRole::Synthesizer);
        assert_eq!(IterationType::Refinement.stage(), AgentRole::Refiner);
        assert_eq!(IterationType::Critique.stage(), AgentRole::Critic);
        assert_eq!(IterationType::MarketAnalysis.stage(), AgentRole::MarketAnalyst);
    }
}
