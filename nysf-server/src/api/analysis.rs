//! Advisory AI commentary for one division

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::analysis::build_prompt;
use crate::db::reports::{division_stats, DivisionStats};
use crate::error::{ApiError, ApiResult};
use crate::form::Referential;
use crate::validate::{self, FieldErrors};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub available: bool,
    pub url: String,
    pub configured_model: String,
    pub available_models: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub stats: DivisionStats,
    pub analysis: String,
}

/// GET /api/division-analysis/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let models = state.analysis.probe().await;

    Json(StatusResponse {
        available: models.is_some(),
        url: state.analysis.base_url().to_string(),
        configured_model: state.analysis.model().to_string(),
        available_models: models.unwrap_or_default(),
    })
}

fn parse_request(body: &Value, refs: &Referential) -> Result<(i64, String), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !body.is_object() {
        errors.add("body", "The request body must be a JSON object.");
        return Err(errors);
    }

    let district_id = validate::required_integer(body, "", "district_id", &mut errors);
    if let Some(id) = district_id {
        if !refs.district_ids.contains(&id) {
            errors.add("district_id", "The selected district_id is invalid.");
        }
    }
    let division = validate::required_string(body, "", "division", 255, &mut errors);

    match (district_id, division) {
        (Some(id), Some(division)) if errors.is_empty() => Ok((id, division)),
        _ => Err(errors),
    }
}

/// POST /api/division-analysis/analyze
///
/// Body: `{district_id, division}`. Unavailability is a 503; a division with
/// no submissions is a 404.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AnalysisResponse>> {
    let Json(body) = body.map_err(|rejection| {
        let mut errors = FieldErrors::new();
        errors.add("body", rejection.body_text());
        ApiError::Validation(errors)
    })?;

    let refs = Referential::load(&state.db).await?;
    let (district_id, division) = parse_request(&body, &refs)?;

    if !state.analysis.is_available().await {
        warn!("Analysis service unreachable at {}", state.analysis.base_url());
        return Err(ApiError::ServiceUnavailable(
            "AI analysis service is not available. Please make sure Ollama is running.".to_string(),
        ));
    }

    let stats = division_stats(&state.db, district_id, &division).await?;
    if stats.total_submissions == 0 {
        return Err(ApiError::NotFound(
            "No data available for this division".to_string(),
        ));
    }

    let prompt = build_prompt(&stats);
    let analysis = state.analysis.generate(&prompt).await.map_err(|e| {
        error!("Division analysis failed: {}", e);
        ApiError::Internal(format!("Failed to generate analysis: {}", e))
    })?;

    info!(
        district_id,
        division = %division,
        "Generated division analysis"
    );

    Ok(Json(AnalysisResponse {
        success: true,
        stats,
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refs() -> Referential {
        Referential {
            district_ids: [2].into_iter().collect(),
            sport_ids: Default::default(),
        }
    }

    #[test]
    fn test_parse_request() {
        let ok = parse_request(&json!({"district_id": "2", "division": "Homagama"}), &refs());
        assert_eq!(ok.unwrap(), (2, "Homagama".to_string()));

        let errors = parse_request(&json!({"district_id": 9}), &refs()).unwrap_err();
        assert!(errors.contains("district_id"));
        assert!(errors.contains("division"));
    }
}
