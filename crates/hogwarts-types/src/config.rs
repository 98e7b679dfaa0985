//! Application configuration types.
//!
//! `AppConfig` mirrors `hogsim.toml`. Every section and field has a default,
//! so an empty file (or no file at all) yields a runnable configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub relay: RelayConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; empty means any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_read_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://hogsim.db?mode=rwc".to_string(),
            max_read_connections: 8,
        }
    }
}

/// Where and how the inference service is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub chat_path: String,
    pub multi_agent_path: String,
    /// Ceiling for a whole upstream exchange, body included.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Idle connections kept per host in the client pool.
    pub pool_max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            chat_path: "/chat".to_string(),
            multi_agent_path: "/multiagent/chat".to_string(),
            timeout_secs: 30 * 60,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Chunks buffered between the relay task and the response body.
    pub channel_capacity: usize,
    /// Append an in-band `error` record when the upstream stream breaks.
    pub emit_error_marker: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            emit_error_marker: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Generated per process when absent.
    pub jwt_secret: Option<String>,
    pub issuer: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: "hogwarts-backend".to_string(),
            token_ttl_hours: 7 * 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.chat_path, "/chat");
        assert_eq!(config.upstream.multi_agent_path, "/multiagent/chat");
        assert_eq!(config.upstream.timeout_secs, 1800);
        assert!(!config.relay.emit_error_marker);
        assert_eq!(config.auth.token_ttl_hours, 168);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.relay.channel_capacity, 16);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_app_config_deserialize_partial_section() {
        let toml_str = r#"
[upstream]
base_url = "http://inference:9000"
timeout_secs = 60

[relay]
emit_error_marker = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.upstream.base_url, "http://inference:9000");
        assert_eq!(config.upstream.timeout_secs, 60);
        assert_eq!(config.upstream.chat_path, "/chat");
        assert!(config.relay.emit_error_marker);
        assert_eq!(config.server.port, 8080);
    }
}
