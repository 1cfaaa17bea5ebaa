//! HTTP server settings from TOML (`[server]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8501".to_string(),
            ],
        }
    }
}

impl FileServerConfig {
    /// `host:port` as passed to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
