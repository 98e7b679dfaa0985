//! Application configuration loader.
//!
//! Reads a TOML file into [`AppConfig`], falling back to defaults when the
//! file is missing or malformed, then applies environment overrides.

use std::path::Path;

use hogwarts_types::config::AppConfig;

pub const ENV_UPSTREAM_URL: &str = "HOGSIM_UPSTREAM_URL";
pub const ENV_DATABASE_URL: &str = "HOGSIM_DATABASE_URL";
pub const ENV_JWT_SECRET: &str = "HOGSIM_JWT_SECRET";

/// Load configuration from `path` and the process environment.
pub async fn load_app_config(path: &Path) -> AppConfig {
    let config = read_config_file(path).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

async fn read_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Overlay `HOGSIM_*` variables. Empty values are ignored.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var(ENV_UPSTREAM_URL) {
        config.upstream.base_url = url;
    }
    if let Some(url) = var(ENV_DATABASE_URL) {
        config.database.url = url;
    }
    if let Some(secret) = var(ENV_JWT_SECRET) {
        config.auth.jwt_secret = Some(secret);
    }
    config
}
