//! Port definitions (interfaces for infrastructure adapters)

pub mod feedback_repository;
pub mod idea_repository;
pub mod invocation_logger;
pub mod llm_gateway;
pub mod progress;
