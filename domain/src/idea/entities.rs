//! Idea entities - the versioned record flowing through every stage.

use crate::core::error::DomainError;
use crate::core::topic::Topic;
use crate::idea::value_objects::{
    Constraints, CriticOutput, IdeaDraft, MarketAnalysis, RefinerOutput, SynthesizerOutput,
};
use crate::scoring::{ScoreWeights, Scores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an idea record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdeaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdeaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of an idea record
///
/// ```text
/// Draft -> Generating -> Completed <-> Refining
///               |                        |
///               +-------> Failed <-------+
/// ```
///
/// `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Draft,
    Generating,
    Refining,
    Completed,
    Failed,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IdeaStatus::Draft => "draft",
            IdeaStatus::Generating => "generating",
            IdeaStatus::Refining => "refining",
            IdeaStatus::Completed => "completed",
            IdeaStatus::Failed => "failed",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: IdeaStatus) -> bool {
        use IdeaStatus::*;
        matches!(
            (self, next),
            (Draft, Generating)
                | (Generating, Completed)
                | (Generating, Failed)
                | (Completed, Refining)
                | (Completed, Failed)
                | (Refining, Completed)
                | (Refining, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IdeaStatus::Failed)
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One startup concept at a point in its refinement history (Entity)
///
/// Fields are public for reading and serialization; mutation goes through
/// the methods below so that `updated_at` and `overall_score` never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub id: IdeaId,
    pub version: u32,
    pub status: IdeaStatus,
    pub title: String,
    pub description: String,
    pub topic: Topic,
    pub constraints: Constraints,
    pub market_analysis: MarketAnalysis,
    pub critic_output: Option<CriticOutput>,
    pub pm_refiner_output: Option<RefinerOutput>,
    pub synthesizer_output: Option<SynthesizerOutput>,
    pub feasibility_score: f64,
    pub novelty_score: f64,
    pub market_signal_score: f64,
    pub overall_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdeaRecord {
    /// Create a record from a generated draft, scored with the default weights.
    pub fn new(
        draft: IdeaDraft,
        topic: Topic,
        constraints: Constraints,
        market_analysis: MarketAnalysis,
    ) -> Self {
        Self::with_weights(draft, topic, constraints, market_analysis, &ScoreWeights::default())
    }

    /// Create a record from a generated draft.
    ///
    /// The record starts at version 1 in `Draft` status with interim scores
    /// combined by `weights`, so it is never observable without scores.
    pub fn with_weights(
        draft: IdeaDraft,
        topic: Topic,
        constraints: Constraints,
        market_analysis: MarketAnalysis,
        weights: &ScoreWeights,
    ) -> Self {
        let now = Utc::now();
        let scores = Scores::interim(weights);
        Self {
            id: IdeaId::generate(),
            version: 1,
            status: IdeaStatus::Draft,
            title: draft.title,
            description: draft.description,
            topic,
            constraints,
            market_analysis,
            critic_output: None,
            pm_refiner_output: None,
            synthesizer_output: None,
            feasibility_score: scores.feasibility,
            novelty_score: scores.novelty,
            market_signal_score: scores.market_signal,
            overall_score: scores.overall,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ==================== Status Transitions ====================

    fn transition(&mut self, next: IdeaStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// `Draft -> Generating`
    pub fn start_generation(&mut self) -> Result<(), DomainError> {
        self.transition(IdeaStatus::Generating)
    }

    /// `Completed -> Refining`, bumping the version by one
    pub fn start_refinement(&mut self) -> Result<(), DomainError> {
        self.transition(IdeaStatus::Refining)?;
        self.version += 1;
        Ok(())
    }

    /// `Generating | Refining -> Completed`
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(IdeaStatus::Completed)
    }

    /// Any non-terminal state except `Draft` -> `Failed`, keeping partial fields
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition(IdeaStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    // ==================== Stage-Owned Fields ====================

    pub fn set_market_analysis(&mut self, analysis: MarketAnalysis) {
        self.market_analysis = analysis;
        self.touch();
    }

    pub fn set_critic_output(&mut self, output: CriticOutput) {
        self.critic_output = Some(output);
        self.touch();
    }

    pub fn set_refiner_output(&mut self, output: RefinerOutput) {
        self.pm_refiner_output = Some(output);
        self.touch();
    }

    pub fn set_synthesizer_output(&mut self, output: SynthesizerOutput) {
        self.synthesizer_output = Some(output);
        self.touch();
    }

    /// Replace all scores. `overall_score` comes from [`Scores`], never from an agent.
    pub fn apply_scores(&mut self, scores: Scores) {
        self.feasibility_score = scores.feasibility;
        self.novelty_score = scores.novelty;
        self.market_signal_score = scores.market_signal;
        self.overall_score = scores.overall;
        self.touch();
    }

    /// Current scores as a value object
    pub fn scores(&self) -> Scores {
        Scores {
            feasibility: self.feasibility_score,
            novelty: self.novelty_score,
            market_signal: self.market_signal_score,
            overall: self.overall_score,
        }
    }

    fn touch(&mut self) {
        let now = Utc::now();
        // Keep updated_at monotonic even if the wall clock steps back
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}
