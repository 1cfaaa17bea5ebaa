//! Idea value objects - the structured outputs each stage owns.
//!
//! Every stage output is replaced wholesale when its stage runs again;
//! none of these types are ever merged field by field.

use crate::core::error::DomainError;
use crate::parsing::lenient::{lenient_string, string_list};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form generation constraints (budget, region, audience, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints(Map<String, Value>);

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build constraints from an arbitrary JSON value, which must be an object or null
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(DomainError::InvalidConstraints),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Render as `key: value` lines for prompt templates
    pub fn describe(&self) -> String {
        if self.0.is_empty() {
            return "None".to_string();
        }
        self.0
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("- {}: {}", k, s),
                other => format!("- {}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Market conditions for a topic, produced once per generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    #[serde(alias = "opportunity", deserialize_with = "lenient_string")]
    pub market_opportunity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub competition_level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub growth_potential: String,
    #[serde(alias = "trends", deserialize_with = "string_list")]
    pub key_trends: Vec<String>,
    #[serde(default, alias = "segments", deserialize_with = "string_list")]
    pub target_segments: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub competitors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub competitive_landscape: String,
}

/// A freshly generated concept, before any refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraft {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(alias = "summary", deserialize_with = "lenient_string")]
    pub description: String,
}

impl IdeaDraft {
    /// Maximum title length in characters
    pub const MAX_TITLE_CHARS: usize = 80;

    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Critique of one idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticOutput {
    #[serde(deserialize_with = "string_list")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, alias = "improvement_suggestions", deserialize_with = "string_list")]
    pub suggestions: Vec<String>,
    #[serde(default, alias = "risk_factors", deserialize_with = "string_list")]
    pub risks: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub opportunities: Vec<String>,
}

/// Product-management refinement of one idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinerOutput {
    #[serde(alias = "refinements", deserialize_with = "string_list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub priorities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timeline: String,
    #[serde(default, deserialize_with = "string_list")]
    pub resources: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub user_stories: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub success_metrics: Vec<String>,
}

/// Three-year revenue projection, one free-text estimate per year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueProjections {
    #[serde(deserialize_with = "lenient_string")]
    pub year1: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year2: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year3: String,
}

/// Final polished write-up of one idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizerOutput {
    #[serde(deserialize_with = "lenient_string")]
    pub final_concept: String,
    #[serde(default, deserialize_with = "string_list")]
    pub key_features: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub business_model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub go_to_market: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value_proposition: String,
    #[serde(default, deserialize_with = "string_list")]
    pub target_customers: Vec<String>,
    pub revenue_projections: RevenueProjections,
}
