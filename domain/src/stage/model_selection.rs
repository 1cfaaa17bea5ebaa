//! Per-agent model selection.
//!
//! A [`ModelSelection`] answers "which model does this agent use". Lookup
//! order is: per-request override, configured per-agent override, default.

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::stage::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Model for every agent without an override
    pub default: Model,
    #[serde(default)]
    pub overrides: BTreeMap<AgentRole, Model>,
}

impl ModelSelection {
    pub fn new(default: Model) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, role: AgentRole, model: Model) -> Self {
        self.overrides.insert(role, model);
        self
    }

    /// Model used by `role`
    pub fn model_for(&self, role: AgentRole) -> &Model {
        self.overrides.get(&role).unwrap_or(&self.default)
    }

    /// Layer request-level overrides on top of this selection
    pub fn layered(&self, overrides: &BTreeMap<AgentRole, Model>) -> Self {
        let mut merged = self.clone();
        for (role, model) in overrides {
            merged.overrides.insert(*role, model.clone());
        }
        merged
    }

    /// Parse `agent name -> model id` settings as sent by clients.
    ///
    /// Unknown agent names and blank model ids are rejected.
    pub fn parse_settings(
        settings: &HashMap<String, String>,
    ) -> Result<BTreeMap<AgentRole, Model>, DomainError> {
        let mut parsed = BTreeMap::new();
        for (agent, model) in settings {
            let role: AgentRole = agent.parse()?;
            let model = model.trim();
            if model.is_empty() {
                return Err(DomainError::InvalidModel(format!(
                    "empty model for agent {}",
                    agent
                )));
            }
            let Ok(model) = model.parse::<Model>();
            parsed.insert(role, model);
        }
        Ok(parsed)
    }
}
