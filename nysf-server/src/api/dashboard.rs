//! Administrator dashboard

use axum::{extract::State, Json};

use crate::db::dashboard::{load_dashboard, Dashboard};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    Ok(Json(load_dashboard(&state.db).await?))
}
