//! Offline gateway answering every role with fixed, schema-valid JSON.
//!
//! Used by `--mock` and `provider.kind = "mock"` to exercise the whole
//! pipeline without network access or API keys.

use async_trait::async_trait;
use cofounder_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, SessionSpec,
};
use cofounder_domain::{AgentRole, Model};
use serde_json::{Value, json};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CannedGateway {
    latency: Duration,
}

impl CannedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply, to make progress output visible
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl LlmGateway for CannedGateway {
    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(CannedSession {
            role: spec.role,
            model: spec.model.clone(),
            latency: self.latency,
        }))
    }
}

pub struct CannedSession {
    role: AgentRole,
    model: Model,
    latency: Duration,
}

#[async_trait]
impl LlmSession for CannedSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, _content: &str) -> Result<String, GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        // Wrapped in a fence like a chatty model would
        Ok(format!("```json\n{}\n```", canned_reply(self.role)))
    }
}

fn canned_reply(role: AgentRole) -> Value {
    match role {
        AgentRole::MarketAnalyst => json!({
            "market_opportunity": "Growing demand with room for a focused entrant",
            "competition_level": "medium",
            "growth_potential": "high",
            "key_trends": ["AI adoption", "subscription fatigue", "mobile-first usage"],
            "target_segments": ["early adopters", "small teams"],
            "competitors": ["incumbent suites", "niche startups"],
            "competitive_landscape": "Fragmented; no dominant specialist"
        }),
        AgentRole::IdeaGenerator => {
            let names = [
                ("Pulse", "A lightweight assistant that turns daily signals into one next action"),
                ("Stackwise", "A marketplace matching small teams with vetted automation recipes"),
                ("Loopback", "Feedback loops for customers delivered as a weekly digest"),
                ("Groundwork", "Guided setup that gets new users to value in ten minutes"),
                ("Tally", "Usage-based billing analytics for indie software makers"),
                ("Relay", "Hand-off notes between shifts, summarised automatically"),
                ("Brightline", "Compliance checklists that update as regulations change"),
                ("Harbor", "A shared inbox for community questions with suggested answers"),
                ("Sprout", "Micro-courses generated from a team's own documentation"),
                ("Northstar", "Goal tracking that links metrics to weekly rituals"),
            ];
            json!({
                "ideas": names
                    .iter()
                    .map(|(title, description)| json!({ "title": title, "description": description }))
                    .collect::<Vec<_>>()
            })
        }
        AgentRole::Critic => json!({
            "strengths": ["clear pain point", "simple first version"],
            "weaknesses": ["crowded category", "unclear pricing power"],
            "suggestions": ["start with one vertical", "validate willingness to pay"],
            "risks": ["platform dependency"],
            "opportunities": ["partnerships with adjacent tools"]
        }),
        AgentRole::Refiner => json!({
            "features": ["onboarding wizard", "weekly summary", "team sharing"],
            "priorities": ["activation", "retention"],
            "timeline": "MVP in 8 weeks, beta in 12",
            "resources": ["2 engineers", "1 designer"],
            "user_stories": ["As a new user I want value on day one"],
            "success_metrics": ["week-4 retention", "paid conversion"]
        }),
        AgentRole::Synthesizer => json!({
            "final_concept": "A focused tool that solves one recurring pain for small teams",
            "key_features": ["onboarding wizard", "weekly summary", "team sharing"],
            "business_model": "Freemium with per-seat subscription",
            "go_to_market": "Content-led growth and integrations marketplace listings",
            "value_proposition": "Less busywork, faster decisions",
            "target_customers": ["small teams", "solo founders"],
            "revenue_projections": { "year1": "$120k", "year2": "$900k", "year3": "$3.5M" }
        }),
        AgentRole::Evaluator => json!({ "feasibility": 0.7, "novelty": 0.8, "market_signal": 0.6 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryIdeaRepository;
    use cofounder_application::{GenerateIdeasInput, GenerateIdeasUseCase, PipelineParams};
    use cofounder_domain::{IdeaStatus, extract_json_object};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_every_role_replies_with_json() {
        let gateway = CannedGateway::new();
        for role in AgentRole::ALL {
            let spec = SessionSpec {
                role,
                model: Model::default(),
                system_prompt: String::new(),
                params: Default::default(),
            };
            let session = gateway.create_session(&spec).await.unwrap();
            let text = session.send("anything").await.unwrap();
            assert!(extract_json_object(&text).is_some(), "{role}");
        }
    }

    #[tokio::test]
    async fn test_full_generation_without_network() {
        let repository = Arc::new(InMemoryIdeaRepository::new());
        let use_case = GenerateIdeasUseCase::new(
            Arc::new(CannedGateway::new()),
            Arc::clone(&repository),
            PipelineParams::default(),
        );

        let output = use_case
            .execute(GenerateIdeasInput::new("AI-powered fitness apps").with_num_ideas(2))
            .await
            .unwrap();

        assert_eq!(output.ideas.len(), 2);
        for idea in &output.ideas {
            assert_eq!(idea.status, IdeaStatus::Completed);
            assert!((idea.overall_score - 0.7).abs() < 1e-9);
            assert_eq!(idea.market_analysis.key_trends.len(), 3);
        }
        assert_eq!(repository.len().await, 2);
    }
}
