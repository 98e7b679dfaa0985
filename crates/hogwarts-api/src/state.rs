//! Application state wiring all services together.
//!
//! Services are generic over the core ports; AppState pins them to the
//! concrete infra implementations.

use std::sync::Arc;

use hogwarts_core::relay::{ChatRelayService, RelayOptions};
use hogwarts_core::service::character::CharacterService;
use hogwarts_core::service::user::UserService;
use hogwarts_infra::crypto::password::Argon2PasswordHasher;
use hogwarts_infra::crypto::random::roll_below;
use hogwarts_infra::crypto::token::Hs256TokenIssuer;
use hogwarts_infra::sqlite::character::SqliteCharacterRepository;
use hogwarts_infra::sqlite::pool::DatabasePool;
use hogwarts_infra::sqlite::user::SqliteUserRepository;
use hogwarts_infra::upstream::HttpUpstreamDispatcher;
use hogwarts_types::config::{AppConfig, RelayConfig};

pub type ConcreteRelayService = ChatRelayService<HttpUpstreamDispatcher>;

pub type ConcreteUserService =
    UserService<SqliteUserRepository, Argon2PasswordHasher, Hs256TokenIssuer>;

pub type ConcreteCharacterService = CharacterService<SqliteCharacterRepository>;

#[derive(Clone)]
pub struct AppState {
    pub relay_service: Arc<ConcreteRelayService>,
    pub user_service: Arc<ConcreteUserService>,
    pub character_service: Arc<ConcreteCharacterService>,
    pub relay_config: RelayConfig,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database, build the shared HTTP client and wire services.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool =
            DatabasePool::new(&config.database.url, config.database.max_read_connections).await?;

        let dispatcher = HttpUpstreamDispatcher::new(&config.upstream)?;
        let relay_service = ChatRelayService::new(
            dispatcher,
            RelayOptions {
                emit_error_marker: config.relay.emit_error_marker,
            },
        );

        let secret = match config.auth.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "no JWT secret configured; using a random per-process secret, sessions will not survive a restart"
                );
                Hs256TokenIssuer::random_secret()
            }
        };
        let tokens = Hs256TokenIssuer::new(
            secret,
            config.auth.issuer.clone(),
            chrono::Duration::hours(config.auth.token_ttl_hours),
        );

        let user_service = UserService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
            tokens,
        );
        let character_service = CharacterService::new(
            SqliteCharacterRepository::new(db_pool.clone()),
            roll_below,
        );

        tracing::info!(upstream = %config.upstream.base_url, "application state initialized");

        Ok(Self {
            relay_service: Arc::new(relay_service),
            user_service: Arc::new(user_service),
            character_service: Arc::new(character_service),
            relay_config: config.relay.clone(),
            db_pool,
        })
    }
}
