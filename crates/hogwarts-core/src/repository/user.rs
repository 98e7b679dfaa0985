//! User repository trait definition.

use hogwarts_types::error::RepositoryError;
use hogwarts_types::user::{User, UserId};

/// Persistence for player accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate username yields `RepositoryError::Conflict`.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}
