//! SQLite user repository.

use hogwarts_core::repository::user::UserRepository;
use hogwarts_types::error::RepositoryError;
use hogwarts_types::user::{User, UserId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    email: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl SqliteUserRepository {
    async fn fetch_one_where(
        &self,
        column: &'static str,
        value: String,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT * FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| UserRow::from_row(&row).map_err(query_error)?.into_user())
            .transpose()
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("username '{}' already exists", user.username)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("id", id.to_string()).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("username", username.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::test_pool;
    use chrono::Utc;

    fn make_user(username: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            email: format!("{username}@hogwarts.example"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("hermione");
        repo.create(&user).await.unwrap();

        let by_id = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "hermione");
        assert_eq!(by_id.password_hash, user.password_hash);

        let by_name = repo.get_by_username("hermione").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(repo.get_by_username("ron").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create(&make_user("seamus")).await.unwrap();
        let err = repo.create(&make_user("seamus")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
