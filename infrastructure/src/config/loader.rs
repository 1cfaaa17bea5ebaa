//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "ai-cofounder";
const PROJECT_FILES: [&str; 2] = ["cofounder.toml", ".cofounder.toml"];
const ENV_PREFIX: &str = "COFOUNDER_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `COFOUNDER_GENERATION__TEMPERATURE=0.2`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./cofounder.toml` or `./.cofounder.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/ai-cofounder/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Self::with_env(figment).extract().map_err(Box::new)
    }

    /// Load a single file on top of the defaults, ignoring other sources
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn with_env(figment: Figment) -> Figment {
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/ai-cofounder/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for `cofounder config`)
    pub fn describe_sources(config_path: Option<&PathBuf>) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = config_path {
            lines.push(format!("  [FOUND] Explicit: {}", path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./cofounder.toml or ./.cofounder.toml".into()),
        }
        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }
        lines.push(format!("  [     ] Env:     {}*", ENV_PREFIX));
        lines.push("  [     ] Default: built-in defaults".into());
        lines
    }
}
