//! Selects the inference back-end and shapes the envelope.

use secrecy::SecretString;

use hogwarts_types::chat::{ChatRequest, ConversationTurn};
use hogwarts_types::relay::UpstreamTarget;

use super::envelope::UpstreamEnvelope;
use crate::prompt::{PromptMode, SystemPromptBuilder};

/// A request ready for dispatch.
#[derive(Debug)]
pub struct RoutedRequest {
    pub target: UpstreamTarget,
    pub envelope: UpstreamEnvelope,
    /// Whether the prologue rules were injected.
    pub prologue: bool,
}

/// Deterministic, total routing over the `multi_agent` flag and the
/// prologue check. Message content is never inspected.
pub struct AgentRouter;

impl AgentRouter {
    /// Build the envelope around an already-assembled system prompt.
    ///
    /// Outbound turn order: main system prompt, the prologue rules when the
    /// game state is in its opening phase, then the caller's turns unchanged.
    pub fn route(request: &ChatRequest, system_prompt: String) -> RoutedRequest {
        let mode = PromptMode::from_flag(request.multi_agent);
        let prologue = request
            .game_state
            .as_ref()
            .is_some_and(|state| state.is_prologue());

        let mut messages = Vec::with_capacity(request.turns.len() + 2);
        messages.push(ConversationTurn::system(system_prompt));
        if prologue {
            messages.push(ConversationTurn::system(SystemPromptBuilder::prologue_rules(mode)));
        }
        messages.extend(request.turns.iter().cloned());

        let (target, game_state) = match mode {
            PromptMode::MultiAgent => (UpstreamTarget::MultiAgentChat, request.game_state.clone()),
            PromptMode::SingleAgent => (UpstreamTarget::Chat, None),
        };

        RoutedRequest {
            target,
            envelope: UpstreamEnvelope {
                messages,
                api_key: SecretString::from(request.credential.clone()),
                model: request.model_name.clone(),
                game_state,
            },
            prologue,
        }
    }
}
