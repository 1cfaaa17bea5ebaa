//! Console output formatter for generated ideas

use colored::Colorize;
use cofounder_application::GenerateIdeasOutput;
use cofounder_domain::{IdeaRecord, IdeaStatus};
use serde::Serialize;

/// Formats pipeline results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Every stage output of every idea
    pub fn format(output: &GenerateIdeasOutput) -> String {
        let mut text = String::new();
        text.push_str(&Self::header("Startup Ideas"));
        text.push('\n');

        if let Some(first) = output.ideas.first() {
            text.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), first.topic));
            if !first.constraints.is_empty() {
                text.push_str(&format!(
                    "{}\n{}\n",
                    "Constraints:".cyan().bold(),
                    Self::indent(&first.constraints.describe(), "  ")
                ));
            }
            text.push_str(&Self::section_header("Market Analysis"));
            text.push_str(&Self::format_market(first));
        }

        for (index, record) in output.ideas.iter().enumerate() {
            text.push_str(&Self::section_header(&format!(
                "Idea {}: {}",
                index + 1,
                record.title
            )));
            text.push_str(&Self::format_record(record));
        }

        text.push_str(&Self::summary_line(output));
        text.push_str(&Self::footer());
        text
    }

    /// One block per idea: title, scores, concept
    pub fn format_summary(output: &GenerateIdeasOutput) -> String {
        let mut text = String::new();
        text.push_str(&format!("{}\n\n", "=== Startup Ideas ===".cyan().bold()));

        for (index, record) in output.ideas.iter().enumerate() {
            text.push_str(&format!(
                "{} {}  {}\n",
                format!("{}.", index + 1).bold(),
                record.title.bold(),
                Self::status_badge(record.status)
            ));
            text.push_str(&format!("   {}\n", Self::score_line(record).dimmed()));
            if let Some(synthesis) = &record.synthesizer_output {
                text.push_str(&format!("   {}\n", synthesis.final_concept));
            } else {
                text.push_str(&format!("   {}\n", record.description));
            }
            text.push('\n');
        }

        text.push_str(&Self::summary_line(output));
        text
    }

    /// Pretty-printed JSON of any serializable result
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Full view of a single record
    pub fn format_record(record: &IdeaRecord) -> String {
        let mut text = String::new();
        text.push_str(&format!(
            "{} {}  {} v{}\n",
            "Id:".dimmed(),
            record.id,
            Self::status_badge(record.status),
            record.version
        ));
        text.push_str(&format!("{}\n", Self::score_line(record)));
        if let Some(reason) = &record.failure_reason {
            text.push_str(&format!("{} {}\n", "Failure:".red().bold(), reason));
        }
        text.push_str(&format!("\n{}\n", record.description));

        if let Some(critique) = &record.critic_output {
            text.push_str(&format!("\n{}\n", "Critique".yellow().bold()));
            text.push_str(&Self::list("Strengths", &critique.strengths));
            text.push_str(&Self::list("Weaknesses", &critique.weaknesses));
            text.push_str(&Self::list("Suggestions", &critique.suggestions));
            text.push_str(&Self::list("Risks", &critique.risks));
            text.push_str(&Self::list("Opportunities", &critique.opportunities));
        }

        if let Some(refinement) = &record.pm_refiner_output {
            text.push_str(&format!("\n{}\n", "Refinement".yellow().bold()));
            text.push_str(&Self::list("Features", &refinement.features));
            text.push_str(&Self::list("Priorities", &refinement.priorities));
            if !refinement.timeline.is_empty() {
                text.push_str(&format!("  {} {}\n", "Timeline:".bold(), refinement.timeline));
            }
            text.push_str(&Self::list("Success metrics", &refinement.success_metrics));
        }

        if let Some(synthesis) = &record.synthesizer_output {
            text.push_str(&format!("\n{}\n", "Synthesis".green().bold()));
            text.push_str(&format!("  {}\n", synthesis.final_concept));
            text.push_str(&Self::list("Key features", &synthesis.key_features));
            text.push_str(&Self::field("Business model", &synthesis.business_model));
            text.push_str(&Self::field("Go to market", &synthesis.go_to_market));
            text.push_str(&Self::field("Value proposition", &synthesis.value_proposition));
            text.push_str(&Self::list("Target customers", &synthesis.target_customers));
            let projections = &synthesis.revenue_projections;
            text.push_str(&format!(
                "  {} Y1 {} | Y2 {} | Y3 {}\n",
                "Revenue:".bold(),
                projections.year1,
                projections.year2,
                projections.year3
            ));
        }
        text
    }

    fn format_market(record: &IdeaRecord) -> String {
        let market = &record.market_analysis;
        let mut text = String::new();
        text.push_str(&format!("{}\n", market.market_opportunity));
        text.push_str(&Self::field("Competition", &market.competition_level));
        text.push_str(&Self::field("Growth", &market.growth_potential));
        text.push_str(&Self::list("Trends", &market.key_trends));
        text.push_str(&Self::list("Segments", &market.target_segments));
        text.push_str(&Self::list("Competitors", &market.competitors));
        text
    }

    fn score_line(record: &IdeaRecord) -> String {
        format!(
            "overall {:.2} (feasibility {:.2}, novelty {:.2}, market {:.2})",
            record.overall_score,
            record.feasibility_score,
            record.novelty_score,
            record.market_signal_score
        )
    }

    fn status_badge(status: IdeaStatus) -> String {
        match status {
            IdeaStatus::Completed => format!("[{}]", status).green().to_string(),
            IdeaStatus::Failed => format!("[{}]", status).red().to_string(),
            _ => format!("[{}]", status).yellow().to_string(),
        }
    }

    fn summary_line(output: &GenerateIdeasOutput) -> String {
        let failed = output.failed_count();
        let line = format!(
            "{} ideas, {} failed (generation {})",
            output.ideas.len(),
            failed,
            output.generation_id
        );
        if failed > 0 {
            format!("\n{}\n", line.red())
        } else {
            format!("\n{}\n", line.dimmed())
        }
    }

    fn list(label: &str, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let mut text = format!("  {}\n", format!("{}:", label).bold());
        for item in items {
            text.push_str(&format!("    * {}\n", item));
        }
        text
    }

    fn field(label: &str, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        format!("  {} {}\n", format!("{}:", label).bold(), value)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
