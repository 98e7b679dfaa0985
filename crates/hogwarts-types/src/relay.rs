//! Wire-level types shared by the relay and the inference back-end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which inference back-end a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamTarget {
    /// Single-agent path: game state is folded into the prompt text.
    Chat,
    /// Multi-agent path: game state travels as a structured field.
    MultiAgentChat,
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamTarget::Chat => write!(f, "chat"),
            UpstreamTarget::MultiAgentChat => write!(f, "multi_agent_chat"),
        }
    }
}

/// Kind tag for text fragments in an event record.
pub const EVENT_KIND_TEXT: &str = "text";

/// Kind tag for errors reported in-band by the inference service.
pub const EVENT_KIND_ERROR: &str = "error";

/// Payload marking the end of an event stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A typed record from the inference service: `{"type": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "content", default)]
    pub text: String,
}

impl UpstreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: EVENT_KIND_TEXT.to_string(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: EVENT_KIND_ERROR.to_string(),
            text: text.into(),
        }
    }

    /// Render as a single `data:` record terminated by a blank line.
    pub fn to_data_line(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {json}\n\n")
    }
}
