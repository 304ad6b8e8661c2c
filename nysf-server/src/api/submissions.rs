//! Submission CRUD and the bulk submission export

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::db::submissions::{
    count_submissions, create_submission, delete_submission, get_submission, get_submission_detail,
    list_submissions, update_submission, SubmissionDetail, SubmissionInput, SubmissionSummary,
};
use crate::error::{ApiError, ApiResult};
use crate::export::bulk::export_submissions;
use crate::form::{parse_submission, Referential};
use crate::pagination::{Page, PageWindow};
use crate::validate::FieldErrors;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Parse and validate a request body against the current catalog
async fn validated_input(
    state: &AppState,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<SubmissionInput> {
    let Json(body) = body.map_err(|rejection| {
        let mut errors = FieldErrors::new();
        errors.add("body", rejection.body_text());
        ApiError::Validation(errors)
    })?;

    let refs = Referential::load(&state.db).await?;
    Ok(parse_submission(&body, &refs)?)
}

async fn load_detail(state: &AppState, id: i64) -> ApiResult<SubmissionDetail> {
    get_submission_detail(&state.db, id)
        .await?
        .ok_or(ApiError::Common(nysf_common::Error::NotFound {
            entity: "Submission",
            id,
        }))
}

/// POST /api/submissions
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmissionDetail>)> {
    let input = validated_input(&state, body).await?;
    let id = create_submission(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(load_detail(&state, id).await?)))
}

/// GET /api/submissions?page=N
///
/// Newest first, 15 per page; out-of-range pages are clamped.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<SubmissionSummary>>> {
    let total = count_submissions(&state.db).await?;
    let window = PageWindow::clamp(total, query.page);
    let data = list_submissions(&state.db, window).await?;
    Ok(Json(Page::new(total, window, data)))
}

/// GET /api/submissions/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SubmissionDetail>> {
    Ok(Json(load_detail(&state, id).await?))
}

/// PUT /api/submissions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SubmissionDetail>> {
    // Unknown ids are a 404 even when the body is also invalid
    if get_submission(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Submission {} not found", id)));
    }

    let input = validated_input(&state, body).await?;
    if !update_submission(&state.db, id, &input).await? {
        return Err(ApiError::NotFound(format!("Submission {} not found", id)));
    }
    Ok(Json(load_detail(&state, id).await?))
}

/// DELETE /api/submissions/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    if delete_submission(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Submission {} not found", id)))
    }
}

/// GET /api/submissions/export
///
/// Print-ready HTML, one page per submission.
pub async fn export(State(state): State<AppState>) -> ApiResult<Response> {
    let html = export_submissions(&state.db).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"submissions.html\"",
            ),
        ],
        html,
    )
        .into_response())
}
