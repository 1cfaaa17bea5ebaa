//! Prompt templates for the idea pipeline

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    // ==================== Market Analyst ====================

    pub fn market_analyst_system() -> &'static str {
        r#"You are a Market Analyst specializing in startup ecosystems and technology trends.
Your role is to analyze market conditions, identify opportunities, and assess market potential.
Provide data-driven insights and concrete market intelligence."#
    }

    pub fn market_analysis_prompt(topic: &str, constraints: &str) -> String {
        format!(
            r#"Analyze the market for: {topic}

Constraints:
{constraints}

Cover market size and growth potential, key trends, the competitive landscape,
target customer segments, and the main barriers to entry.

{}"#,
            Self::json_instruction(
                r#"{
  "market_opportunity": "one paragraph",
  "competition_level": "low | medium | high",
  "growth_potential": "low | medium | high",
  "key_trends": ["..."],
  "target_segments": ["..."],
  "competitors": ["..."],
  "competitive_landscape": "one paragraph"
}"#
            )
        )
    }

    // ==================== Idea Generator ====================

    pub fn idea_generator_system() -> &'static str {
        r#"You are an Idea Generator specializing in creating innovative startup ideas.
Generate creative, feasible, and market-relevant startup concepts with clear value propositions.
Consider market opportunities, technology trends, and user needs."#
    }

    pub fn idea_generation_prompt(
        topic: &str,
        constraints: &str,
        market_analysis: &str,
        count: usize,
    ) -> String {
        format!(
            r#"Generate exactly {count} distinct startup ideas for: {topic}

Market analysis:
{market_analysis}

Constraints:
{constraints}

Each idea needs a short title (at most 80 characters) and a description covering
the problem, the solution, and the target customer.

{}"#,
            Self::json_instruction(
                r#"{
  "ideas": [
    { "title": "...", "description": "..." }
  ]
}"#
            )
        )
    }

    // ==================== Critic ====================

    pub fn critic_system() -> &'static str {
        r#"You are a Critic specializing in evaluating startup ideas and business concepts.
Provide objective, constructive criticism and identify potential issues.
Assess feasibility, market viability, competitive positioning, and implementation challenges.
Be thorough but fair, highlighting both strengths and weaknesses."#
    }

    pub fn critique_prompt(title: &str, description: &str, market_analysis: &str) -> String {
        format!(
            r#"Critically evaluate this startup idea:

Title: {title}
Description: {description}

Market analysis:
{market_analysis}

{}"#,
            Self::json_instruction(
                r#"{
  "strengths": ["..."],
  "weaknesses": ["..."],
  "suggestions": ["..."],
  "risks": ["..."],
  "opportunities": ["..."]
}"#
            )
        )
    }

    // ==================== Refiner ====================

    pub fn refiner_system() -> &'static str {
        r#"You are a PM Refiner specializing in turning critiqued startup ideas into actionable product plans.
Address the critique with practical improvements while keeping the core vision and value proposition."#
    }

    pub fn refinement_prompt(
        title: &str,
        description: &str,
        critique: &str,
        constraints: &str,
    ) -> String {
        format!(
            r#"Refine this startup idea based on the critique:

Title: {title}
Description: {description}

Critique:
{critique}

Constraints:
{constraints}

Produce a prioritized feature list, a realistic timeline, the resources required,
key user stories, and measurable success metrics.

{}"#,
            Self::json_instruction(
                r#"{
  "features": ["..."],
  "priorities": ["..."],
  "timeline": "...",
  "resources": ["..."],
  "user_stories": ["..."],
  "success_metrics": ["..."]
}"#
            )
        )
    }

    // ==================== Synthesizer ====================

    pub fn synthesizer_system() -> &'static str {
        r#"You are a Synthesizer specializing in creating final, polished startup concepts.
Combine the analysis, critique, and refinements into a cohesive, market-ready concept
that is ready for presentation to stakeholders."#
    }

    pub fn synthesis_prompt(
        title: &str,
        description: &str,
        market_analysis: &str,
        refinement: &str,
    ) -> String {
        format!(
            r#"Synthesize the final concept for this startup idea:

Title: {title}
Description: {description}

Market analysis:
{market_analysis}

Product refinement:
{refinement}

{}"#,
            Self::json_instruction(
                r#"{
  "final_concept": "one paragraph",
  "key_features": ["..."],
  "business_model": "...",
  "go_to_market": "...",
  "value_proposition": "...",
  "target_customers": ["..."],
  "revenue_projections": { "year1": "...", "year2": "...", "year3": "..." }
}"#
            )
        )
    }

    // ==================== Evaluator ====================

    pub fn evaluator_system() -> &'static str {
        r#"You are a venture analyst scoring startup ideas.
Score each dimension independently on a scale from 0.0 to 1.0.
Feasibility is how realistic it is to build and operate.
Novelty is how original the idea is compared to existing offerings.
Market signal is the strength of evidence that customers want it."#
    }

    pub fn evaluation_prompt(title: &str, description: &str, dossier: &str) -> String {
        format!(
            r#"Evaluate this startup idea:

Title: {title}
Description: {description}

{dossier}

{}"#,
            Self::json_instruction(
                r#"{
  "feasibility": 0.0,
  "novelty": 0.0,
  "market_signal": 0.0
}"#
            )
        )
    }

    // ==================== Shared Helpers ====================

    /// Instruction block asking for a single JSON object of the given shape
    pub fn json_instruction(shape: &str) -> String {
        format!(
            "Respond with a single JSON object in a ```json code block, using exactly this shape:\n\n```json\n{}\n```",
            shape
        )
    }

    /// Append user feedback to a stage prompt
    pub fn with_feedback(prompt: String, feedback: Option<&str>) -> String {
        match feedback.map(str::trim).filter(|f| !f.is_empty()) {
            Some(feedback) => format!(
                "{prompt}\n\nUser feedback to address in this revision:\n{feedback}"
            ),
            None => prompt,
        }
    }

    /// Render items as a markdown bullet list, or "None" when empty
    pub fn bullet_list(items: &[String]) -> String {
        if items.is_empty() {
            return "None".to_string();
        }
        items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
