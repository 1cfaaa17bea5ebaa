//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - available LLM models (Gemini, GPT, local)
//! - [`topic::Topic`] - a validated generation topic
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
pub mod topic;
