//! Conversation types and the inbound chat/summarize request shapes.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::game_state::GameStateSnapshot;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single turn in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
///
/// Constructed once per HTTP call and never mutated afterwards. The JSON
/// field names follow what the web client sends (`messages`, `api_key`,
/// `model`), while the Rust names describe what the fields mean to the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Prior conversation turns, oldest first.
    #[serde(rename = "messages", default)]
    pub turns: Vec<ConversationTurn>,

    /// Rolling story summary, oldest fragment first.
    #[serde(default, deserialize_with = "deserialize_summary")]
    pub summary: Vec<String>,

    /// Behavioral profile of the player character, inserted verbatim.
    #[serde(default)]
    pub persona: Option<String>,

    /// Current game state, hydrated by the caller.
    #[serde(default, alias = "status")]
    pub game_state: Option<GameStateSnapshot>,

    /// Inference provider credential forwarded upstream.
    #[serde(rename = "api_key", default)]
    pub credential: String,

    /// Inference model identifier.
    #[serde(rename = "model", default)]
    pub model_name: String,

    /// Route through the multi-agent back-end.
    #[serde(default)]
    pub multi_agent: bool,
}

/// Body of `POST /api/ai/summarize`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    #[serde(rename = "messages", default)]
    pub turns: Vec<ConversationTurn>,
    #[serde(rename = "api_key", default)]
    pub credential: String,
    #[serde(rename = "model", default)]
    pub model_name: String,
}

/// Response of `POST /api/ai/summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Accepts either a list of fragments or a single summary string.
///
/// A single non-empty string becomes a one-element summary; an empty string
/// or `null` becomes an empty summary.
fn deserialize_summary<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SummaryWire {
        Many(Vec<String>),
        One(String),
    }

    Ok(match Option::<SummaryWire>::deserialize(deserializer)? {
        Some(SummaryWire::Many(fragments)) => fragments,
        Some(SummaryWire::One(text)) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}
