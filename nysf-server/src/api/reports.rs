//! Sports participation matrix: interactive data, print view and workbook

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use nysf_common::db::District;
use serde::{Deserialize, Serialize};

use crate::db::catalog::{get_district, list_districts, list_sports, sport_ids};
use crate::error::ApiResult;
use crate::export::export_all_districts;
use crate::export::print::matrix_print_html;
use crate::matrix::{build_district_matrix, column_sports, MatrixView};
use crate::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    pub district_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub districts: Vec<District>,
    pub selected_district_id: Option<i64>,
    #[serde(flatten)]
    pub view: MatrixView,
}

/// Project the selected district, or an empty view when none is selected
async fn district_view(
    state: &AppState,
    district_id: Option<i64>,
) -> ApiResult<(Option<District>, MatrixView)> {
    let columns = column_sports(&list_sports(&state.db).await?);

    let Some(id) = district_id else {
        return Ok((
            None,
            MatrixView {
                columns,
                rows: Vec::new(),
            },
        ));
    };

    let district = get_district(&state.db, id)
        .await?
        .ok_or(nysf_common::Error::NotFound {
            entity: "District",
            id,
        })?;

    let known_sports = sport_ids(&state.db).await?;
    let matrix = build_district_matrix(&state.db, id, &known_sports).await?;
    Ok((Some(district), MatrixView::project(&matrix, columns)))
}

/// GET /api/reports/sports-matrix?district_id=N
pub async fn sports_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> ApiResult<Json<MatrixResponse>> {
    let (_, view) = district_view(&state, query.district_id).await?;

    Ok(Json(MatrixResponse {
        districts: list_districts(&state.db).await?,
        selected_district_id: query.district_id,
        view,
    }))
}

/// GET /reports/sports-matrix/print?district_id=N
pub async fn sports_matrix_print(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> ApiResult<Response> {
    let (district, view) = district_view(&state, query.district_id).await?;
    let html = matrix_print_html(district.as_ref(), &view);
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response())
}

/// GET /reports/sports-matrix/export
///
/// One worksheet per district, all districts.
pub async fn sports_matrix_export(State(state): State<AppState>) -> ApiResult<Response> {
    let workbook = export_all_districts(&state.db).await?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sports_matrix_all_districts.xlsx\"",
            ),
        ],
        workbook,
    )
        .into_response())
}
