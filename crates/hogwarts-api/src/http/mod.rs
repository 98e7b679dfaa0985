//! HTTP API layer.
//!
//! Axum router under `/api/` with bearer-token authentication and
//! `{"error": "..."}` error bodies.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;

#[cfg(test)]
mod tests;
