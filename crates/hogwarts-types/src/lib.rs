//! Shared domain types for the Hogwarts role-play backend.
//!
//! Conversation turns, game-state snapshots, characters, users, the wire
//! shapes exchanged with the inference service, configuration types, and
//! their associated error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod character;
pub mod chat;
pub mod config;
pub mod error;
pub mod game_state;
pub mod relay;
pub mod user;
