//! Parsing of model responses into structured values.

pub mod json;
pub mod lenient;

pub use json::extract_json_object;
