//! Idea and feedback repository adapters.

mod json_file;
mod memory;

pub use json_file::JsonFileIdeaRepository;
pub use memory::{InMemoryFeedbackRepository, InMemoryIdeaRepository};
