//! Storage and log destinations from TOML (`[storage]`, `[logging]`)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStorageKind {
    #[default]
    Memory,
    JsonFile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub kind: FileStorageKind,
    /// Directory for `json_file` storage
    pub path: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.kind == FileStorageKind::JsonFile && self.path.is_none() {
            return Err(ConfigValidationError::MissingStoragePath);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rolling tracing output
    pub dir: Option<PathBuf>,
    /// JSONL file receiving one line per model call
    pub invocation_log: Option<PathBuf>,
}
