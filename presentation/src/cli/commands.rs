//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for generated ideas
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage output of every idea
    Full,
    /// Title, scores and final concept only
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for ai-cofounder
#[derive(Parser, Debug)]
#[command(name = "cofounder")]
#[command(author, version, about = "AI startup co-founder - generate, critique and refine startup ideas")]
#[command(long_about = r#"
Runs a pipeline of LLM agents over a topic to produce scored startup ideas.

Each generation runs a market analysis, generates ideas, then critiques,
refines, synthesizes and scores every idea in parallel.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./cofounder.toml    Project-level config
3. ~/.config/ai-cofounder/config.toml   Global config
Environment variables prefixed COFOUNDER_ override all files
(nested keys use "__", e.g. COFOUNDER_SERVER__PORT=9000).

Example:
  cofounder serve --port 8000
  cofounder generate "AI-powered fitness apps" -n 3 -c budget=low
  cofounder --mock generate "meal planning" -o json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Use canned model replies instead of a real provider
    #[arg(long, global = true)]
    pub mock: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate ideas for a topic and print them
    Generate {
        /// Topic to generate ideas about
        topic: String,

        /// Number of ideas (1-10)
        #[arg(short = 'n', long)]
        num_ideas: Option<usize>,

        /// Constraint as key=value (can be specified multiple times)
        #[arg(short, long = "constraint", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        constraints: Vec<(String, String)>,

        /// Model for one agent as agent=model (can be specified multiple times)
        #[arg(short, long = "model", value_name = "AGENT=MODEL", value_parser = parse_key_value)]
        models: Vec<(String, String)>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        output: OutputFormat,
    },

    /// Show configuration sources and the effective configuration
    Config,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
