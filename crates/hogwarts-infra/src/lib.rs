//! Infrastructure layer for the Hogwarts backend.
//!
//! Implements the ports defined in hogwarts-core: SQLite repositories,
//! Argon2 password hashing, HS256 session tokens and the HTTP client for the
//! inference service.

pub mod config;
pub mod crypto;
pub mod sqlite;
pub mod upstream;
