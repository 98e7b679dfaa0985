//! SQLite character repository.
//!
//! `game_state` and `summary` are stored as JSON text columns.

use hogwarts_core::repository::character::CharacterRepository;
use hogwarts_types::character::{Character, CharacterId};
use hogwarts_types::error::RepositoryError;
use hogwarts_types::game_state::GameStateSnapshot;
use hogwarts_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteCharacterRepository {
    pool: DatabasePool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct CharacterRow {
    id: String,
    user_id: String,
    name: String,
    gender: String,
    house: String,
    blood_status: String,
    wand: String,
    patronus: String,
    persona: String,
    summary: String,
    game_state: String,
    created_at: String,
    updated_at: String,
}

impl CharacterRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            gender: row.try_get("gender")?,
            house: row.try_get("house")?,
            blood_status: row.try_get("blood_status")?,
            wand: row.try_get("wand")?,
            patronus: row.try_get("patronus")?,
            persona: row.try_get("persona")?,
            summary: row.try_get("summary")?,
            game_state: row.try_get("game_state")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_character(self) -> Result<Character, RepositoryError> {
        let id = self
            .id
            .parse::<CharacterId>()
            .map_err(|e| RepositoryError::Query(format!("invalid character id: {e}")))?;
        let user_id = self
            .user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let summary: Vec<String> = serde_json::from_str(&self.summary)
            .map_err(|e| RepositoryError::Query(format!("invalid summary JSON: {e}")))?;
        let game_state: GameStateSnapshot = serde_json::from_str(&self.game_state)
            .map_err(|e| RepositoryError::Query(format!("invalid game_state JSON: {e}")))?;

        Ok(Character {
            id,
            user_id,
            name: self.name,
            gender: self.gender,
            house: self.house,
            blood_status: self.blood_status,
            wand: self.wand,
            patronus: self.patronus,
            persona: self.persona,
            summary,
            game_state,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl CharacterRepository for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<Character, RepositoryError> {
        sqlx::query(
            "INSERT INTO characters (id, user_id, name, gender, house, blood_status, wand, patronus, persona, summary, game_state, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(character.user_id.to_string())
        .bind(&character.name)
        .bind(&character.gender)
        .bind(&character.house)
        .bind(&character.blood_status)
        .bind(&character.wand)
        .bind(&character.patronus)
        .bind(&character.persona)
        .bind(encode_json(&character.summary)?)
        .bind(encode_json(&character.game_state)?)
        .bind(format_datetime(&character.created_at))
        .bind(format_datetime(&character.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(character.clone())
    }

    async fn get(
        &self,
        user_id: &UserId,
        id: &CharacterId,
    ) -> Result<Option<Character>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| CharacterRow::from_row(&row).map_err(query_error)?.into_character())
            .transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Character>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM characters WHERE user_id = ? ORDER BY updated_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut characters = Vec::with_capacity(rows.len());
        for row in &rows {
            characters.push(CharacterRow::from_row(row).map_err(query_error)?.into_character()?);
        }
        Ok(characters)
    }

    async fn update_state(&self, character: &Character) -> Result<Character, RepositoryError> {
        let result = sqlx::query(
            "UPDATE characters SET persona = ?, summary = ?, game_state = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&character.persona)
        .bind(encode_json(&character.summary)?)
        .bind(encode_json(&character.game_state)?)
        .bind(format_datetime(&character.updated_at))
        .bind(character.id.to_string())
        .bind(character.user_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(character.clone())
    }

    async fn delete(&self, user_id: &UserId, id: &CharacterId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
