//! nysf-server library - festival data collection and reporting
//!
//! District officers submit participation and financial data; administrators
//! read the per-district sports participation matrix, its print view and
//! workbook export, the dashboard, and advisory AI commentary.

use axum::Router;
use nysf_common::config::ServiceConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analysis;
pub mod api;
pub mod db;
pub mod error;
pub mod export;
pub mod financial;
pub mod form;
pub mod matrix;
pub mod pagination;
pub mod validate;

use analysis::AnalysisClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Client for the advisory analysis service
    pub analysis: AnalysisClient,
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, analysis: AnalysisClient, config: ServiceConfig) -> Self {
        Self {
            db,
            analysis,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/catalog", get(api::get_catalog))
        .route(
            "/api/submissions",
            get(api::submissions::list).post(api::submissions::create),
        )
        .route("/api/submissions/export", get(api::submissions::export))
        .route(
            "/api/submissions/:id",
            get(api::submissions::show)
                .put(api::submissions::update)
                .delete(api::submissions::destroy),
        )
        .route("/api/reports/sports-matrix", get(api::sports_matrix))
        .route("/api/dashboard", get(api::get_dashboard))
        .route("/api/division-analysis/status", get(api::analysis::status))
        .route("/api/division-analysis/analyze", post(api::analysis::analyze));

    let reports = Router::new()
        .route("/reports/sports-matrix/print", get(api::sports_matrix_print))
        .route("/reports/sports-matrix/export", get(api::sports_matrix_export));

    Router::new()
        .merge(api)
        .merge(reports)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
