//! # NYSF Common Library
//!
//! Shared code for the National Youth Sports Festival data-collection service:
//! - Error type
//! - Configuration resolution (CLI → ENV → TOML → compiled default)
//! - Database initialization, seed catalog and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
