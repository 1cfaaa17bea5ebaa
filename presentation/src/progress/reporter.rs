//! Progress reporting for pipeline execution

use colored::Colorize;
use cofounder_application::ProgressNotifier;
use cofounder_domain::{AgentRole, IdeaId, IdeaRecord, IdeaStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with a spinner for shared stages and a bar over ideas
pub struct ProgressReporter {
    multi: MultiProgress,
    ideas_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            ideas_bar: Mutex::new(None),
        }
    }

    fn ideas_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_display_name(role: AgentRole) -> &'static str {
        match role {
            AgentRole::MarketAnalyst => "Analyzing market",
            AgentRole::IdeaGenerator => "Generating ideas",
            AgentRole::Critic => "Critiquing",
            AgentRole::Refiner => "Refining",
            AgentRole::Synthesizer => "Synthesizing",
            AgentRole::Evaluator => "Scoring",
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.ideas_bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }

    /// Finish the bar, if one was started
    pub fn finish(&self) {
        if let Ok(mut guard) = self.ideas_bar.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_with_message(format!("{}", "done".green()));
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_generation_start(&self, num_ideas: usize) {
        let bar = self.multi.add(ProgressBar::new(num_ideas as u64));
        bar.set_style(Self::ideas_style());
        bar.set_prefix("Ideas");
        bar.set_message("Starting...");
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.ideas_bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_stage_start(&self, role: AgentRole, idea: Option<&IdeaId>) {
        let name = Self::stage_display_name(role);
        let message = match idea {
            Some(id) => format!("{} {}", name, short_id(id)),
            None => name.to_string(),
        };
        self.with_bar(|bar| bar.set_message(message));
    }

    fn on_stage_complete(&self, role: AgentRole, idea: Option<&IdeaId>, degraded: bool) {
        if degraded {
            let target = idea.map(short_id).unwrap_or("shared");
            let _ = self.multi.println(format!(
                "  {} {} ({}) used fallback output",
                "!".yellow(),
                role,
                target
            ));
        }
    }

    fn on_idea_complete(&self, record: &IdeaRecord) {
        self.with_bar(|bar| {
            let status = if record.status == IdeaStatus::Failed {
                format!("{} {}", "x".red(), record.title)
            } else {
                format!("{} {}", "v".green(), record.title)
            };
            bar.set_message(status);
            bar.inc(1);
        });
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_generation_start(&self, num_ideas: usize) {
        println!("{} {} ({} ideas)", "->".cyan(), "Generating".bold(), num_ideas);
    }

    fn on_stage_start(&self, _role: AgentRole, _idea: Option<&IdeaId>) {}

    fn on_stage_complete(&self, role: AgentRole, idea: Option<&IdeaId>, degraded: bool) {
        let target = idea.map(short_id).unwrap_or("shared");
        if degraded {
            println!("  {} {} [{}] (fallback)", "!".yellow(), role, target);
        } else {
            println!("  {} {} [{}]", "v".green(), role, target);
        }
    }

    fn on_idea_complete(&self, record: &IdeaRecord) {
        println!(
            "{} {} ({}, {:.2})",
            "->".cyan(),
            record.title.bold(),
            record.status,
            record.overall_score
        );
    }
}

fn short_id(id: &IdeaId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(&IdeaId::new("0123456789abcdef")), "01234567");
        assert_eq!(short_id(&IdeaId::new("abc")), "abc");
    }

    #[test]
    fn test_every_role_has_a_label() {
        for role in AgentRole::ALL {
            assert!(!ProgressReporter::stage_display_name(role).is_empty());
        }
    }

    #[test]
    fn test_reporter_without_start_is_noop() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(AgentRole::Critic, None);
        reporter.finish();
        assert!(reporter.ideas_bar.lock().unwrap().is_none());
    }
}
