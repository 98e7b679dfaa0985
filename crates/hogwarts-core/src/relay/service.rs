//! Per-request orchestration of a chat turn.
//!
//! Validating -> BuildingPrompt -> Dispatching -> Relaying -> terminal phase.

use std::fmt;

use tokio_util::sync::CancellationToken;

use hogwarts_types::chat::{ChatRequest, ConversationTurn, SummarizeRequest};
use hogwarts_types::error::RelayError;
use hogwarts_types::relay::UpstreamTarget;

use secrecy::SecretString;

use super::aggregate::aggregate_events;
use super::dispatcher::{ByteStream, UpstreamDispatcher};
use super::envelope::UpstreamEnvelope;
use super::router::{AgentRouter, RoutedRequest};
use super::stream::{relay_pass_through, ChunkSink, RelayOptions, RelayOutcome};
use crate::prompt::{PromptMode, PromptOptions, SystemPromptBuilder};

/// Lifecycle phases of one chat request, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Validating,
    BuildingPrompt,
    Dispatching,
    Relaying,
    Completed,
    ClientDisconnected,
    UpstreamFailed,
    ValidationFailed,
}

impl fmt::Display for ChatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChatPhase::Validating => "validating",
            ChatPhase::BuildingPrompt => "building_prompt",
            ChatPhase::Dispatching => "dispatching",
            ChatPhase::Relaying => "relaying",
            ChatPhase::Completed => "completed",
            ChatPhase::ClientDisconnected => "client_disconnected",
            ChatPhase::UpstreamFailed => "upstream_failed",
            ChatPhase::ValidationFailed => "validation_failed",
        };
        f.write_str(name)
    }
}

/// Builds prompts, routes requests and relays upstream responses.
pub struct ChatRelayService<D: UpstreamDispatcher> {
    dispatcher: D,
    options: RelayOptions,
}

impl<D: UpstreamDispatcher> ChatRelayService<D> {
    pub fn new(dispatcher: D, options: RelayOptions) -> Self {
        Self { dispatcher, options }
    }

    /// Validate the request and turn it into a routed envelope.
    pub fn prepare(&self, request: &ChatRequest) -> Result<RoutedRequest, RelayError> {
        tracing::debug!(phase = %ChatPhase::Validating, turns = request.turns.len());
        if let Err(e) = validate_credential(&request.credential) {
            tracing::debug!(phase = %ChatPhase::ValidationFailed, error = %e);
            return Err(e);
        }

        tracing::debug!(phase = %ChatPhase::BuildingPrompt, multi_agent = request.multi_agent);
        let prompt = SystemPromptBuilder::build(&PromptOptions {
            mode: PromptMode::from_flag(request.multi_agent),
            persona: request.persona.as_deref(),
            summary: &request.summary,
            game_state: request.game_state.as_ref(),
        })?;

        Ok(AgentRouter::route(request, prompt))
    }

    /// Validate, build and dispatch; returns the live upstream body.
    ///
    /// Every failure here happens before any response byte is written, so the
    /// caller can still answer with an HTTP status.
    #[tracing::instrument(skip_all, fields(multi_agent = request.multi_agent))]
    pub async fn open_chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, RelayError> {
        let routed = self.prepare(request)?;
        tracing::debug!(
            phase = %ChatPhase::Dispatching,
            target = %routed.target,
            prologue = routed.prologue,
            messages = routed.envelope.messages.len(),
        );
        self.dispatcher
            .dispatch(routed.target, &routed.envelope, cancel)
            .await
    }

    /// Relay an opened upstream body into `sink` and log the terminal phase.
    pub async fn relay<S: ChunkSink>(
        &self,
        source: ByteStream,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> RelayOutcome {
        tracing::debug!(phase = %ChatPhase::Relaying);
        let outcome = relay_pass_through(source, sink, cancel, self.options).await;
        match &outcome {
            RelayOutcome::Completed { bytes, chunks } => {
                tracing::debug!(phase = %ChatPhase::Completed, bytes, chunks);
            }
            RelayOutcome::ClientDisconnected { bytes } => {
                tracing::debug!(phase = %ChatPhase::ClientDisconnected, bytes);
            }
            RelayOutcome::UpstreamFailed { bytes, error } => {
                tracing::debug!(phase = %ChatPhase::UpstreamFailed, bytes, error = %error);
            }
        }
        outcome
    }

    /// Ask the single-agent back-end for a story summary of `request.turns`.
    #[tracing::instrument(skip_all, fields(turns = request.turns.len()))]
    pub async fn summarize(
        &self,
        request: &SummarizeRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RelayError> {
        validate_credential(&request.credential)?;

        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        messages.extend(request.turns.iter().cloned());
        messages.push(ConversationTurn::user(SystemPromptBuilder::summary_instruction()));

        let envelope = UpstreamEnvelope {
            messages,
            api_key: SecretString::from(request.credential.clone()),
            model: request.model_name.clone(),
            game_state: None,
        };

        let source = self
            .dispatcher
            .dispatch(UpstreamTarget::Chat, &envelope, cancel)
            .await?;
        let summary = aggregate_events(source, cancel).await?;
        tracing::info!(chars = summary.len(), "story summary generated");
        Ok(summary)
    }
}

fn validate_credential(credential: &str) -> Result<(), RelayError> {
    if credential.trim().is_empty() {
        return Err(RelayError::Validation("api_key must not be empty".to_string()));
    }
    Ok(())
}
