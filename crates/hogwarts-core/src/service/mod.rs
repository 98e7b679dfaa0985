//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and business rules. They depend on
//! traits (ports), never on concrete infrastructure.

pub mod auth;
pub mod character;
pub mod user;
