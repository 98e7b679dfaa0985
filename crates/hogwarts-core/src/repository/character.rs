//! Character repository trait definition.
//!
//! Every lookup is scoped to the owning user; a character belonging to
//! someone else is indistinguishable from a missing one.

use hogwarts_types::character::{Character, CharacterId};
use hogwarts_types::error::RepositoryError;
use hogwarts_types::user::UserId;

pub trait CharacterRepository: Send + Sync {
    /// Insert a new character.
    fn create(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// Fetch a character owned by `user_id`.
    fn get(
        &self,
        user_id: &UserId,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// All characters of `user_id`, most recently updated first.
    fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Character>, RepositoryError>> + Send;

    /// Overwrite persona, summary and game state. `NotFound` when the row
    /// is missing or owned by another user.
    fn update_state(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    /// Delete a character. `NotFound` when missing or not owned.
    fn delete(
        &self,
        user_id: &UserId,
        id: &CharacterId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
