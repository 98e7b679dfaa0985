//! The request body sent to the inference service.

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use hogwarts_types::chat::ConversationTurn;
use hogwarts_types::game_state::GameStateSnapshot;

/// Wire body for the inference back-end.
///
/// Single-agent envelopes carry `messages`, `api_key` and `model`; multi-agent
/// envelopes add the structured `game_state`. The credential is only exposed
/// during serialization and never appears in `Debug` output.
#[derive(Debug, Serialize)]
pub struct UpstreamEnvelope {
    pub messages: Vec<ConversationTurn>,
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: SecretString,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameStateSnapshot>,
}

impl UpstreamEnvelope {
    /// Encode as the JSON request body.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
