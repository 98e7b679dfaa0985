//! System prompt builder for the narrator.
//!
//! Assembles the main system prompt from the static rule text, the player's
//! persona, the game-state snapshot and the rolling story summary, using XML
//! tag boundaries for clear section delineation.

use hogwarts_types::error::RelayError;
use hogwarts_types::game_state::GameStateSnapshot;

const CORE_RULES: &str = include_str!("rules/core_rules.md");
const MULTI_AGENT_CORE_RULES: &str = include_str!("rules/multi_agent_core_rules.md");
const PROLOGUE_RULES: &str = include_str!("rules/prologue_rules.md");
const MULTI_AGENT_PROLOGUE_RULES: &str = include_str!("rules/multi_agent_prologue_rules.md");

/// Static rules appended when asking the model for a story summary.
pub const SUMMARY_RULES: &str = include_str!("rules/summary_rules.md");

/// Which back-end the prompt is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Game state is folded into the prompt text.
    SingleAgent,
    /// Game state travels structurally; the prompt stays narrative-only.
    MultiAgent,
}

impl PromptMode {
    pub fn from_flag(multi_agent: bool) -> Self {
        if multi_agent {
            PromptMode::MultiAgent
        } else {
            PromptMode::SingleAgent
        }
    }
}

/// Inputs to [`SystemPromptBuilder::build`].
#[derive(Debug, Clone, Copy)]
pub struct PromptOptions<'a> {
    pub mode: PromptMode,
    pub persona: Option<&'a str>,
    pub summary: &'a [String],
    pub game_state: Option<&'a GameStateSnapshot>,
}

/// Builds the system turns sent ahead of the conversation history.
///
/// Layout of the main prompt:
/// ```text
/// {core rules for the mode}
/// <persona>{persona, verbatim}</persona>
/// <game_state>{pretty JSON}</game_state>        (single-agent only)
/// <story_summary>{fragments, one per line}</story_summary>
/// ```
pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Build the main system prompt.
    ///
    /// Fails only when the game state cannot be serialized, which is fatal
    /// to the request.
    pub fn build(options: &PromptOptions<'_>) -> Result<String, RelayError> {
        let mut sections = Vec::with_capacity(4);

        sections.push(Self::core_rules(options.mode).trim_end().to_string());

        if let Some(persona) = options.persona.filter(|p| !p.trim().is_empty()) {
            sections.push(format!("<persona>\n{persona}\n</persona>"));
        }

        if options.mode == PromptMode::SingleAgent {
            if let Some(state) = options.game_state {
                let json = serde_json::to_string_pretty(state)
                    .map_err(|e| RelayError::Serialization(format!("game state: {e}")))?;
                sections.push(format!("<game_state>\n{json}\n</game_state>"));
            }
        }

        if !options.summary.is_empty() {
            sections.push(format!(
                "<story_summary>\n{}\n</story_summary>",
                options.summary.join("\n")
            ));
        }

        Ok(sections.join("\n\n"))
    }

    /// The extra system turn injected during the prologue.
    pub fn prologue_rules(mode: PromptMode) -> &'static str {
        match mode {
            PromptMode::SingleAgent => PROLOGUE_RULES,
            PromptMode::MultiAgent => MULTI_AGENT_PROLOGUE_RULES,
        }
    }

    fn core_rules(mode: PromptMode) -> &'static str {
        match mode {
            PromptMode::SingleAgent => CORE_RULES,
            PromptMode::MultiAgent => MULTI_AGENT_CORE_RULES,
        }
    }

    /// The user turn that asks the model to summarize everything before it.
    pub fn summary_instruction() -> String {
        format!(
            "System instruction: step out of the role-play. Based on the whole conversation \
             above, write the story summary exactly as follows:\n{SUMMARY_RULES}"
        )
    }
}
