//! Output formatting for generated ideas

pub mod console;
