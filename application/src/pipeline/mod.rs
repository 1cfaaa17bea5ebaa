//! Pipeline building blocks shared by the use cases.

pub mod invoker;
pub mod locks;
pub mod scorer;
pub mod stage_runner;

pub use invoker::{Invocation, InvokeError, ModelInvoker};
pub use locks::IdeaLocks;
pub use scorer::Scorer;
pub use stage_runner::{StageFailure, StageFailureKind, StageOutcome, StageRunner};
