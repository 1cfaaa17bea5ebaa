//! Progress notification port
//!
//! Defines the interface for reporting progress while the pipeline runs.

use cofounder_domain::{AgentRole, IdeaId, IdeaRecord};

/// Callback for progress updates during generation and iteration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.). Chains run on
/// separate tasks, so callbacks may arrive concurrently.
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any stage of a generation runs
    fn on_generation_start(&self, _num_ideas: usize) {}

    /// Called when a stage starts; `idea` is `None` for shared stages
    fn on_stage_start(&self, role: AgentRole, idea: Option<&IdeaId>);

    /// Called when a stage finishes, successfully or via its fallback
    fn on_stage_complete(&self, role: AgentRole, idea: Option<&IdeaId>, degraded: bool);

    /// Called when an idea reaches its final status
    fn on_idea_complete(&self, _record: &IdeaRecord) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _role: AgentRole, _idea: Option<&IdeaId>) {}
    fn on_stage_complete(&self, _role: AgentRole, _idea: Option<&IdeaId>, _degraded: bool) {}
}
