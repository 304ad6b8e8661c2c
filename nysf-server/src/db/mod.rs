//! Database access for the service
//!
//! Schema creation and seeding live in `nysf_common::db`; this module holds
//! the queries behind each endpoint.

pub mod catalog;
pub mod dashboard;
pub mod reports;
pub mod submissions;
