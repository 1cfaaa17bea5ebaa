//! Logging infrastructure: structured model invocation log.
//!
//! Provides [`JsonlInvocationLogger`], a JSONL file writer that implements
//! the [`InvocationLogger`](cofounder_application::InvocationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlInvocationLogger;
