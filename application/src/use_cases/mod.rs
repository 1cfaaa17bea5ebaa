//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate_ideas;
pub mod iterate_idea;
pub mod manage_feedback;
pub mod read_ideas;
pub(crate) mod shared;
