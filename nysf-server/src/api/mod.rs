//! HTTP API handlers for nysf-server

pub mod analysis;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod submissions;

pub use catalog::get_catalog;
pub use dashboard::get_dashboard;
pub use health::health_routes;
pub use reports::{sports_matrix, sports_matrix_export, sports_matrix_print};
