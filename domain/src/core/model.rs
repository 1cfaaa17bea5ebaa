//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// Any identifier the provider accepts can be used through
/// [`Model::Custom`]; the named variants exist so that routing can infer
/// the provider family without configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // Gemini models
    Gemini15Pro,
    Gemini15Flash,
    Gemini20Flash,
    // GPT models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    // Local models
    Llama2,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gemini15Pro => "gemini-1.5-pro",
            Model::Gemini15Flash => "gemini-1.5-flash",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::Llama2 => "llama2",
            Model::Custom(s) => s,
        }
    }

    /// Check if this is a Gemini model
    pub fn is_gemini(&self) -> bool {
        match self {
            Model::Gemini15Pro | Model::Gemini15Flash | Model::Gemini20Flash => true,
            Model::Custom(s) => s.starts_with("gemini-"),
            _ => false,
        }
    }

    /// Check if this is a GPT model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt4o | Model::Gpt4oMini | Model::Gpt41 => true,
            Model::Custom(s) => s.starts_with("gpt-") || s.starts_with("o1") || s.starts_with("o3"),
            _ => false,
        }
    }
}

impl Default for Model {
    /// Returns the default model (Gemini 1.5 Pro)
    fn default() -> Self {
        Model::Gemini15Pro
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gemini-1.5-pro" => Model::Gemini15Pro,
            "gemini-1.5-flash" => Model::Gemini15Flash,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "llama2" => Model::Llama2,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
