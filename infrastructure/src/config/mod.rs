//! Configuration file loading for ai-cofounder
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `COFOUNDER_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./cofounder.toml` or `./.cofounder.toml`
//! 4. Global: `$XDG_CONFIG_HOME/ai-cofounder/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileModelsConfig, FileProviderConfig, FileProviderKind, FileScoringConfig, FileServerConfig,
    FileStorageConfig, FileStorageKind,
};
pub use loader::ConfigLoader;
