//! Character creation and game-state persistence.

use chrono::Utc;

use hogwarts_types::character::{
    Character, CharacterId, CreateCharacterRequest, UpdateCharacterStateRequest,
};
use hogwarts_types::error::{CharacterError, RepositoryError};
use hogwarts_types::game_state::{CharacterStatus, GAME_MODE_WEEKLY, GameStateSnapshot, PROLOGUE_YEAR};
use hogwarts_types::user::UserId;

use crate::repository::character::CharacterRepository;

const NAME_MAX: usize = 100;
const BASE_MANA: i32 = 15;
const MANA_SPREAD: u32 = 10;

/// Uniform roll in `[0, n)`. Injected so the service stays deterministic
/// under test.
pub type DiceRoll = fn(u32) -> u32;

/// Starting stats for a first-year arriving in late August 1991.
pub fn initial_status(mana: i32) -> CharacterStatus {
    CharacterStatus {
        hp: 100,
        mp: mana,
        max_mp: mana,
        gold: 0,
        ap: 7,
        max_ap: 7,
        knowledge: 15,
        athletics: 40,
        charm: 50,
        morality: 50,
        mental: 45,
        current_year: PROLOGUE_YEAR,
        current_month: 8,
        current_week: 3,
        current_weekday: 1,
        location: String::new(),
        game_mode: GAME_MODE_WEEKLY.to_string(),
    }
}

pub struct CharacterService<R: CharacterRepository> {
    repo: R,
    roll: DiceRoll,
}

impl<R: CharacterRepository> CharacterService<R> {
    pub fn new(repo: R, roll: DiceRoll) -> Self {
        Self { repo, roll }
    }

    /// Starting mana in `[15, 25)`.
    fn roll_mana(&self) -> i32 {
        BASE_MANA + ((self.roll)(MANA_SPREAD) % MANA_SPREAD) as i32
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateCharacterRequest,
    ) -> Result<Character, CharacterError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(CharacterError::InvalidInput("name cannot be empty".to_string()));
        }
        if name.chars().count() > NAME_MAX {
            return Err(CharacterError::InvalidInput(format!(
                "name must be at most {NAME_MAX} characters"
            )));
        }

        let id = CharacterId::new();
        let mana = self.roll_mana();
        let now = Utc::now();
        let character = Character {
            id,
            user_id: *user_id,
            name,
            gender: request.gender,
            house: String::new(),
            blood_status: request.blood_status,
            wand: request.wand,
            patronus: request.patronus,
            persona: String::new(),
            summary: Vec::new(),
            game_state: GameStateSnapshot {
                status: initial_status(mana),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        };

        let character = self.repo.create(&character).await.map_err(storage)?;
        tracing::info!(character_id = %character.id, "character created");
        Ok(character)
    }

    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Character>, CharacterError> {
        self.repo.list_by_user(user_id).await.map_err(storage)
    }

    pub async fn get(
        &self,
        user_id: &UserId,
        id: &CharacterId,
    ) -> Result<Character, CharacterError> {
        self.repo
            .get(user_id, id)
            .await
            .map_err(storage)?
            .ok_or(CharacterError::NotFound)
    }

    /// Save a new game-state snapshot, optionally replacing summary and persona.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, character_id = %id))]
    pub async fn update_state(
        &self,
        user_id: &UserId,
        id: &CharacterId,
        request: UpdateCharacterStateRequest,
    ) -> Result<Character, CharacterError> {
        let mut character = self.get(user_id, id).await?;
        character.game_state = request.game_state;
        if let Some(summary) = request.summary {
            character.summary = summary;
        }
        if let Some(persona) = request.persona {
            character.persona = persona;
        }
        character.updated_at = Utc::now();

        self.repo.update_state(&character).await.map_err(storage)
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id, character_id = %id))]
    pub async fn delete(&self, user_id: &UserId, id: &CharacterId) -> Result<(), CharacterError> {
        self.repo.delete(user_id, id).await.map_err(storage)?;
        tracing::info!("character deleted");
        Ok(())
    }
}

fn storage(e: RepositoryError) -> CharacterError {
    match e {
        RepositoryError::NotFound => CharacterError::NotFound,
        other => CharacterError::Storage(other.to_string()),
    }
}
