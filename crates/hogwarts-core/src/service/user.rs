//! Account registration, login and profile lookup.

use chrono::Utc;

use hogwarts_types::error::{RepositoryError, UserError};
use hogwarts_types::user::{LoginRequest, LoginResponse, RegisterRequest, User, UserId};

use super::auth::{PasswordHasher, TokenIssuer};
use crate::repository::user::UserRepository;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 100;
const PASSWORD_MIN: usize = 6;

pub struct UserService<R: UserRepository, H: PasswordHasher, T: TokenIssuer> {
    repo: R,
    hasher: H,
    tokens: T,
}

impl<R: UserRepository, H: PasswordHasher, T: TokenIssuer> UserService<R, H, T> {
    pub fn new(repo: R, hasher: H, tokens: T) -> Self {
        Self { repo, hasher, tokens }
    }

    /// Access the token issuer (used by the auth extractor).
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Create an account. Usernames are unique.
    #[tracing::instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserError> {
        let username = request.username.trim().to_string();
        let length = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserError::InvalidInput(format!(
                "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
            )));
        }
        if request.password.chars().count() < PASSWORD_MIN {
            return Err(UserError::InvalidInput(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }

        if self
            .repo
            .get_by_username(&username)
            .await
            .map_err(storage)?
            .is_some()
        {
            return Err(UserError::UsernameTaken(username));
        }

        let password_hash = self.hasher.hash_password(&request.password).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            UserError::Hashing
        })?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: username.clone(),
            password_hash,
            email: request.email.map(|e| e.trim().to_string()).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let user = self.repo.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UsernameTaken(username),
            other => storage(other),
        })?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    #[tracing::instrument(skip_all, fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, UserError> {
        let user = self
            .repo
            .get_by_username(request.username.trim())
            .await
            .map_err(storage)?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.hasher.verify_password(&request.password, &user.password_hash) {
            tracing::debug!("password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(LoginResponse {
            token,
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repo
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(UserError::NotFound)
    }
}

fn storage(e: RepositoryError) -> UserError {
    UserError::Storage(e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use hogwarts_types::error::AuthError;
    use hogwarts_types::user::TokenClaims;

    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        users: Mutex<Vec<User>>,
    }

    impl UserRepository for MemoryUsers {
        async fn create(&self, user: &User) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == user.username) {
                return Err(RepositoryError::Conflict(user.username.clone()));
            }
            users.push(user.clone());
            Ok(user.clone())
        }

        async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
        }

        async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }
    }

    struct ReversingHasher;

    impl PasswordHasher for ReversingHasher {
        fn hash_password(&self, password: &str) -> Result<String, String> {
            Ok(password.chars().rev().collect())
        }

        fn verify_password(&self, password: &str, hash: &str) -> bool {
            password.chars().rev().collect::<String>() == hash
        }
    }

    struct PlainTokens;

    impl TokenIssuer for PlainTokens {
        fn issue(&self, user_id: &UserId) -> Result<String, AuthError> {
            Ok(format!("token-{user_id}"))
        }

        fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
            let id = token.strip_prefix("token-").ok_or(AuthError::Malformed)?;
            Ok(TokenClaims {
                user_id: id.parse().map_err(|_| AuthError::Malformed)?,
                iss: "test".to_string(),
                iat: 0,
                exp: i64::MAX,
            })
        }
    }

    fn service() -> UserService<MemoryUsers, ReversingHasher, PlainTokens> {
        UserService::new(MemoryUsers::default(), ReversingHasher, PlainTokens)
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: Some("owl@hogwarts.example".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let user = svc.register(register_request("neville", "toad123")).await.unwrap();
        assert_ne!(user.password_hash, "toad123");

        let login = svc
            .login(LoginRequest {
                username: "neville".to_string(),
                password: "toad123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user_id, user.id);
        assert_eq!(svc.tokens().verify(&login.token).unwrap().user_id, user.id);
        assert_eq!(login.email, "owl@hogwarts.example");
    }

    #[tokio::test]
    async fn test_register_validates_lengths() {
        let svc = service();
        assert!(matches!(
            svc.register(register_request("ab", "long enough")).await,
            Err(UserError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.register(register_request("luna", "12345")).await,
            Err(UserError::InvalidInput(_))
        ));
        let long = "x".repeat(101);
        assert!(matches!(
            svc.register(register_request(&long, "123456")).await,
            Err(UserError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let svc = service();
        svc.register(register_request("ginny", "bat-bogey")).await.unwrap();
        let err = svc
            .register(register_request("ginny", "another1"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken(name) if name == "ginny"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(register_request("draco", "slytherin")).await.unwrap();

        let wrong_password = svc
            .login(LoginRequest {
                username: "draco".to_string(),
                password: "gryffindor".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_user = svc
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "slytherin".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(unknown_user, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let svc = service();
        assert!(matches!(
            svc.get_user(&UserId::new()).await,
            Err(UserError::NotFound)
        ));
    }
}
