//! Database schema, seed catalog and row models

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
