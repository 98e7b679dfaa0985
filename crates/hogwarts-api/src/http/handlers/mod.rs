//! HTTP request handlers.

pub mod character;
pub mod chat;
pub mod summarize;
pub mod user;
