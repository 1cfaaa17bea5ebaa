//! Per-agent model configuration from TOML (`[models]` section)

use cofounder_domain::{AgentRole, Model, ModelSelection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ConfigValidationError;

/// Model selection from TOML
///
/// # Example
///
/// ```toml
/// [models]
/// default = "gemini-1.5-pro"
///
/// [models.agents]
/// critic = "gpt-4o"
/// synthesizer = "gpt-4.1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Model used by every agent without an override
    pub default: String,
    /// Agent name -> model id
    pub agents: BTreeMap<String, String>,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            default: Model::default().to_string(),
            agents: BTreeMap::new(),
        }
    }
}

impl FileModelsConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.to_selection().map(|_| ())
    }

    /// Build the domain selection, rejecting blank names and unknown agents
    pub fn to_selection(&self) -> Result<ModelSelection, ConfigValidationError> {
        let default = parse_model("models.default", &self.default)?;
        let mut selection = ModelSelection::new(default);
        for (agent, model) in &self.agents {
            let role: AgentRole = agent
                .parse()
                .map_err(|_| ConfigValidationError::UnknownAgent(agent.clone()))?;
            let model = parse_model(&format!("models.agents.{agent}"), model)?;
            selection = selection.with_override(role, model);
        }
        Ok(selection)
    }
}

fn parse_model(field: &str, value: &str) -> Result<Model, ConfigValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigValidationError::EmptyModelName(field.to_string()));
    }
    // Unknown names become Model::Custom
    let Ok(model) = value.parse::<Model>();
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let selection = FileModelsConfig::default().to_selection().unwrap();
        assert_eq!(selection.default, Model::Gemini15Pro);
        assert!(selection.overrides.is_empty());
    }

    #[test]
    fn test_agent_overrides() {
        let mut config = FileModelsConfig::default();
        config.agents.insert("critic".into(), "gpt-4o".into());
        config.agents.insert("pm_refiner".into(), "my-local-model".into());

        let selection = config.to_selection().unwrap();
        assert_eq!(selection.model_for(AgentRole::Critic), &Model::Gpt4o);
        assert_eq!(
            selection.model_for(AgentRole::Refiner),
            &Model::Custom("my-local-model".into())
        );
        assert_eq!(selection.model_for(AgentRole::Synthesizer), &Model::Gemini15Pro);
    }

    #[test]
    fn test_rejects_unknown_agent() {
        let mut config = FileModelsConfig::default();
        config.agents.insert("marketer".into(), "gpt-4o".into());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownAgent("marketer".into()))
        );
    }

    #[test]
    fn test_rejects_blank_model() {
        let config = FileModelsConfig {
            default: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName(_))
        ));
    }
}
