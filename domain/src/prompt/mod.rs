//! Prompt domain
//!
//! Templates for the system and user prompts of every pipeline stage.

mod template;

pub use template::PromptTemplate;
