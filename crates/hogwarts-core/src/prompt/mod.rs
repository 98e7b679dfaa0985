//! Prompt construction for the narrator back-ends.

pub mod builder;

pub use builder::{PromptMode, PromptOptions, SystemPromptBuilder, SUMMARY_RULES};
