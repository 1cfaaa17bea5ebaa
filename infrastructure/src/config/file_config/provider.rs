//! Provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// Which backend answers model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileProviderKind {
    /// Route Gemini models to Gemini and everything else to OpenAI
    #[default]
    Gemini,
    OpenAi,
    /// Canned replies, no network
    Mock,
}

impl std::fmt::Display for FileProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileProviderKind::Gemini => "gemini",
            FileProviderKind::OpenAi => "openai",
            FileProviderKind::Mock => "mock",
        };
        write!(f, "{name}")
    }
}

/// LLM provider endpoints and credentials.
///
/// API keys are read from the environment variables named here, never
/// from the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Default provider for models whose family cannot be inferred
    pub kind: FileProviderKind,
    /// Base URL of an OpenAI-compatible API
    pub openai_base_url: String,
    pub gemini_base_url: String,
    pub openai_api_key_env: String,
    pub gemini_api_key_env: String,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: FileProviderKind::default(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            openai_api_key_env: "OPENAI_API_KEY".to_string(),
            gemini_api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl FileProviderConfig {
    pub fn openai_api_key(&self) -> Option<String> {
        read_key(&self.openai_api_key_env)
    }

    pub fn gemini_api_key(&self) -> Option<String> {
        read_key(&self.gemini_api_key_env)
    }
}

fn read_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}
