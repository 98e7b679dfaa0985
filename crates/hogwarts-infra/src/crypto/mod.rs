//! Password hashing, session tokens and OS randomness.

pub mod password;
pub mod random;
pub mod token;
