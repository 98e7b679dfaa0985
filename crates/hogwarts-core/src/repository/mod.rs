//! Repository trait definitions (ports).
//!
//! Implemented by hogwarts-infra on top of SQLite. The core crate never
//! depends on a storage technology.

pub mod character;
pub mod user;
