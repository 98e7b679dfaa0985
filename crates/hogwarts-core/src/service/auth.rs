//! Credential ports: password hashing and session tokens.
//!
//! Argon2 and HS256 adapters live in hogwarts-infra.

use hogwarts_types::error::AuthError;
use hogwarts_types::user::{TokenClaims, UserId};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string.
    fn hash_password(&self, password: &str) -> Result<String, String>;

    /// Check `password` against a stored hash. Malformed hashes never verify.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Issues and validates bearer tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: &UserId) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
