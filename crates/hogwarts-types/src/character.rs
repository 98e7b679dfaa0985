//! Player characters and their persisted game state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::game_state::GameStateSnapshot;
use crate::user::UserId;

/// Unique identifier for a character, wrapping a UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A player character owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub user_id: UserId,
    pub name: String,
    pub gender: String,
    pub house: String,
    pub blood_status: String,
    pub wand: String,
    pub patronus: String,
    /// Behavioral profile fed to the prompt builder.
    pub persona: String,
    /// Story summary fragments, oldest first.
    pub summary: Vec<String>,
    pub game_state: GameStateSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a character (no maps, no summary).
#[derive(Debug, Clone, Serialize)]
pub struct CharacterListItem {
    pub id: CharacterId,
    pub name: String,
    pub gender: String,
    pub blood_status: String,
    pub wand: String,
    pub patronus: String,
    pub status: crate::game_state::CharacterStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&Character> for CharacterListItem {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            gender: c.gender.clone(),
            blood_status: c.blood_status.clone(),
            wand: c.wand.clone(),
            patronus: c.patronus.clone(),
            status: c.game_state.status.clone(),
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub blood_status: String,
    #[serde(default)]
    pub wand: String,
    #[serde(default)]
    pub patronus: String,
}

/// Replacement of a character's mutable progress.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCharacterStateRequest {
    pub game_state: GameStateSnapshot,
    #[serde(default)]
    pub summary: Option<Vec<String>>,
    #[serde(default)]
    pub persona: Option<String>,
}
