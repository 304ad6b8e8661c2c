//! Entry-form catalog

use axum::{extract::State, Json};
use nysf_common::db::{District, Sport};
use serde::Serialize;

use crate::db::catalog::{list_districts, list_sports};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub districts: Vec<District>,
    pub sports: Vec<Sport>,
}

/// GET /api/catalog
///
/// Districts in local-language order and the real sport catalog by code.
pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<Json<CatalogResponse>> {
    Ok(Json(CatalogResponse {
        districts: list_districts(&state.db).await?,
        sports: list_sports(&state.db).await?,
    }))
}
