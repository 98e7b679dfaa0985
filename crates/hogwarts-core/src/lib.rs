//! Core logic for the Hogwarts role-play backend.
//!
//! Prompt assembly, agent routing, the streaming relay and the account and
//! character services. Storage, HTTP and crypto are reached through the
//! traits defined here and implemented in hogwarts-infra.

pub mod prompt;
pub mod relay;
pub mod repository;
pub mod service;
