//! Test doubles shared by the use case tests.

use crate::ports::feedback_repository::{FeedbackPage, FeedbackQuery, FeedbackRepository};
use crate::ports::idea_repository::{IdeaPage, IdeaQuery, IdeaRepository, RepositoryError};
use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession, SessionSpec};
use crate::ports::progress::ProgressNotifier;
use async_trait::async_trait;
use cofounder_domain::{AgentRole, Feedback, FeedbackId, IdeaId, IdeaRecord, Model};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ==================== Gateway ====================

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Error(GatewayError),
    Delayed(Duration, String),
    Panic,
}

/// Canned happy-path reply for each role
pub fn canned_json(role: AgentRole) -> Value {
    match role {
        AgentRole::MarketAnalyst => json!({
            "market_opportunity": "Consumers want personalised coaching at app prices",
            "competition_level": "high",
            "growth_potential": "high",
            "key_trends": ["wearable integration", "AI personalisation"],
            "target_segments": ["busy professionals"],
            "competitors": ["Fitbod", "Freeletics"]
        }),
        AgentRole::IdeaGenerator => json!({
            "ideas": (1..=10)
                .map(|i| json!({ "title": format!("Idea {i}"), "description": format!("Description {i}") }))
                .collect::<Vec<_>>()
        }),
        AgentRole::Critic => json!({
            "strengths": ["clear need"],
            "weaknesses": ["crowded market"],
            "suggestions": ["niche down"],
            "risks": ["churn"]
        }),
        AgentRole::Refiner => json!({
            "features": ["adaptive plans"],
            "priorities": ["retention"],
            "timeline": "6 months",
            "success_metrics": ["weekly active users"]
        }),
        AgentRole::Synthesizer => json!({
            "final_concept": "An adaptive AI coach",
            "key_features": ["adaptive plans"],
            "business_model": "Subscription",
            "revenue_projections": { "year1": "$100k", "year2": "$1M", "year3": "$5M" }
        }),
        AgentRole::Evaluator => json!({ "feasibility": 0.7, "novelty": 0.8, "market_signal": 0.6 }),
    }
}

/// Scripted gateway: per-role queues of replies, then a default per role.
pub struct MockGateway {
    scripted: Mutex<HashMap<AgentRole, VecDeque<MockReply>>>,
    failing_by_default: bool,
    calls: Arc<Mutex<Vec<(AgentRole, Model, String)>>>,
}

impl MockGateway {
    /// Every unscripted call returns the canned happy-path JSON
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(HashMap::new()),
            failing_by_default: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every unscripted call fails with a service error
    pub fn failing() -> Self {
        Self {
            failing_by_default: true,
            ..Self::new()
        }
    }

    pub fn with_reply(self, role: AgentRole, reply: MockReply) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .entry(role)
            .or_default()
            .push_back(reply);
        self
    }

    pub fn with_json(self, role: AgentRole, value: Value) -> Self {
        self.with_reply(role, MockReply::Text(value.to_string()))
    }

    pub fn calls(&self) -> Vec<(AgentRole, Model, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, role: AgentRole) -> usize {
        self.calls().iter().filter(|(r, _, _)| *r == role).count()
    }

    fn next_reply(&self, role: AgentRole) -> MockReply {
        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&role)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| {
            if self.failing_by_default {
                MockReply::Error(GatewayError::ConnectionError("scripted failure".into()))
            } else {
                MockReply::Text(canned_json(role).to_string())
            }
        })
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn create_session(&self, spec: &SessionSpec) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(MockSession {
            role: spec.role,
            model: spec.model.clone(),
            reply: Mutex::new(Some(self.next_reply(spec.role))),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct MockSession {
    role: AgentRole,
    model: Model,
    reply: Mutex<Option<MockReply>>,
    calls: Arc<Mutex<Vec<(AgentRole, Model, String)>>>,
}

#[async_trait]
impl LlmSession for MockSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((self.role, self.model.clone(), content.to_string()));
        let reply = self.reply.lock().unwrap().take();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(e)) => Err(e),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(MockReply::Panic) => panic!("scripted panic"),
            None => Err(GatewayError::Other("session already used".into())),
        }
    }
}

// ==================== Repository ====================

#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<HashMap<IdeaId, IdeaRecord>>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryRepository {
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn insert(&self, record: IdeaRecord) {
        self.records.lock().unwrap().insert(record.id.clone(), record);
    }

    pub fn snapshot(&self, id: &IdeaId) -> Option<IdeaRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl IdeaRepository for MemoryRepository {
    async fn get(&self, id: &IdeaId) -> Result<Option<IdeaRecord>, RepositoryError> {
        Ok(self.snapshot(id))
    }

    async fn save(&self, record: &IdeaRecord) -> Result<(), RepositoryError> {
        if self.fail_saves {
            return Err(RepositoryError::Io(std::io::Error::other("disk full")));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.insert(record.clone());
        Ok(())
    }

    async fn delete(&self, id: &IdeaId) -> Result<bool, RepositoryError> {
        Ok(self.records.lock().unwrap().remove(id).is_some())
    }

    async fn list(&self, query: &IdeaQuery) -> Result<IdeaPage, RepositoryError> {
        let records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        Ok(query.apply(records))
    }
}

#[derive(Default)]
pub struct MemoryFeedbackRepository {
    items: Mutex<HashMap<FeedbackId, Feedback>>,
}

impl MemoryFeedbackRepository {
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn snapshot(&self, id: &FeedbackId) -> Option<Feedback> {
        self.items.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl FeedbackRepository for MemoryFeedbackRepository {
    async fn get(&self, id: &FeedbackId) -> Result<Option<Feedback>, RepositoryError> {
        Ok(self.snapshot(id))
    }

    async fn save(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        self.items
            .lock()
            .unwrap()
            .insert(feedback.id.clone(), feedback.clone());
        Ok(())
    }

    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError> {
        Ok(self.items.lock().unwrap().remove(id).is_some())
    }

    async fn list(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError> {
        let items: Vec<_> = self.items.lock().unwrap().values().cloned().collect();
        Ok(query.apply(items))
    }
}

// ==================== Logger / Progress ====================

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<Value>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }
}

impl InvocationLogger for RecordingLogger {
    fn log(&self, event: InvocationEvent) {
        self.events.lock().unwrap().push(event.payload);
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub stages: Mutex<Vec<(AgentRole, bool)>>,
    pub completed: AtomicUsize,
}

impl ProgressNotifier for RecordingProgress {
    fn on_stage_start(&self, _role: AgentRole, _idea: Option<&IdeaId>) {}

    fn on_stage_complete(&self, role: AgentRole, _idea: Option<&IdeaId>, degraded: bool) {
        self.stages.lock().unwrap().push((role, degraded));
    }

    fn on_idea_complete(&self, _record: &IdeaRecord) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}
