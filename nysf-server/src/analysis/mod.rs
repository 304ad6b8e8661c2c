//! Advisory division analysis through a local LLM service
//!
//! Failures here are reported to the caller and never touch aggregation or
//! the submission write path.

pub mod client;
pub mod prompt;

pub use client::{AnalysisClient, AnalysisError};
pub use prompt::build_prompt;
