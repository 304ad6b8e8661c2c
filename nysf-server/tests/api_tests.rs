//! Integration tests for nysf-server API endpoints
//!
//! The router is driven in-process against an in-memory database seeded with
//! the district list and sport catalog.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use nysf_common::config::{AnalysisConfig, ConfigOverrides, ServiceConfig, TomlConfig};
use nysf_common::db::{init_memory_database, DISTRICT_LEVEL_DIVISION};
use nysf_server::analysis::AnalysisClient;
use nysf_server::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::io::{Cursor, Read};
use tower::util::ServiceExt; // for `oneshot` method
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Index of Kabaddi (sport 51) among the matrix columns
const KABADDI: usize = 0;
/// Index of the Swimming pseudo-sport column (after 12 real sports)
const SWIMMING: usize = 12;

/// Test helper: Analysis service that nothing listens on
const UNREACHABLE: &str = "http://127.0.0.1:1";

async fn setup_test_db() -> SqlitePool {
    init_memory_database()
        .await
        .expect("Should create in-memory database")
}

fn setup_app_with(db: SqlitePool, analysis_url: &str) -> Router {
    let mut config = ServiceConfig::merge(ConfigOverrides::default(), TomlConfig::default());
    config.analysis = AnalysisConfig {
        url: analysis_url.to_string(),
        probe_timeout_secs: 1,
        generate_timeout_secs: 2,
        ..AnalysisConfig::default()
    };
    let analysis = AnalysisClient::new(&config.analysis).expect("Should build client");
    build_router(AppState::new(db, analysis, config))
}

fn setup_app(db: SqlitePool) -> Router {
    setup_app_with(db, UNREACHABLE)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&read_bytes(body).await).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    String::from_utf8(read_bytes(body).await).expect("Should be UTF-8")
}

fn submission(district_id: i64, division: &str, status: &str) -> Value {
    json!({
        "district_id": district_id,
        "division": division,
        "officer_name": "K. Perera",
        "designation": "YSO",
        "epf_number": "EPF-100",
        "status": status
    })
}

/// POST a submission and return its id
async fn create(app: &Router, body: Value) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/submissions", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await["id"]
        .as_i64()
        .expect("id")
}

async fn matrix(app: &Router, district_id: i64) -> Value {
    let uri = format!("/api/reports/sports-matrix?district_id={}", district_id);
    let response = app.clone().oneshot(test_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

fn labels(matrix: &Value) -> Vec<String> {
    matrix["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["label"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health and catalog
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "nysf-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_catalog_lists_districts_and_sports() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(test_request("GET", "/api/catalog")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["districts"].as_array().unwrap().len(), 26);
    let codes: Vec<i64> = body["sports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_i64().unwrap())
        .collect();
    assert_eq!(codes, vec![51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 70, 71]);
}

// =============================================================================
// Submission write path
// =============================================================================

#[tokio::test]
async fn test_create_returns_detail_with_financial_totals() {
    let app = setup_app(setup_test_db().await);
    let mut body = submission(2, "Homagama", "submitted");
    body["team_sports"] = json!([{"sport_id": 53, "teams_male": 1, "players_male": 12}]);
    body["financial"] = json!({
        "income_head_office": 100,
        "income_external_sources": "50.00",
        "total_income": 9999
    });

    let response = app
        .oneshot(json_request("POST", "/api/submissions", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["division"], "Homagama");
    assert_eq!(detail["status"], "submitted");
    assert!(detail["submitted_at"].is_string());
    assert_eq!(detail["district"]["name_en"], "Colombo");
    assert_eq!(detail["team_sports"][0]["sport_name_en"], "Basketball");
    assert_eq!(detail["financial"]["total_income"], "150.00");
    assert_eq!(detail["financial"]["total_expense"], "0.00");
}

#[tokio::test]
async fn test_create_validation_errors_are_field_keyed() {
    let app = setup_app(setup_test_db().await);
    let body = json!({
        "district_id": 999,
        "designation": "CEO",
        "team_sports": [{"sport_id": 4242, "teams_male": -1}]
    });

    let response = app
        .oneshot(json_request("POST", "/api/submissions", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    let errors = &body["errors"];
    for field in [
        "district_id",
        "division",
        "officer_name",
        "designation",
        "epf_number",
        "team_sports.0.sport_id",
        "team_sports.0.teams_male",
    ] {
        assert!(errors[field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_malformed_json_is_a_body_error() {
    let app = setup_app(setup_test_db().await);
    let request = Request::builder()
        .method("POST")
        .uri("/api/submissions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn test_update_replaces_rows_and_delete_cascades() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());
    let mut body = submission(3, "Negombo", "draft");
    body["team_sports"] = json!([
        {"sport_id": 51, "teams_male": 1},
        {"sport_id": 52, "teams_female": 1}
    ]);
    let id = create(&app, body).await;

    let mut replacement = submission(3, "Negombo", "submitted");
    replacement["swimming"] = json!([{"event_name": "50m", "players_female": 3}]);
    let uri = format!("/api/submissions/{}", id);
    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, &replacement))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["team_sports"].as_array().unwrap().len(), 0);
    assert_eq!(detail["swimming"][0]["event_name"], "50m");
    assert!(detail["submitted_at"].is_string());

    let response = app.clone().oneshot(test_request("DELETE", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swimming_data")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let response = app.oneshot(test_request("GET", &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let app = setup_app(setup_test_db().await);

    for (method, uri) in [("GET", "/api/submissions/77"), ("DELETE", "/api/submissions/77")] {
        let response = app.clone().oneshot(test_request(method, uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/submissions/77",
            &submission(2, "Homagama", "draft"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_paginated_newest_first() {
    let app = setup_app(setup_test_db().await);
    for i in 0..17 {
        create(&app, submission(2, &format!("Division {}", i), "draft")).await;
    }

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/submissions"))
        .await
        .unwrap();
    let first = extract_json(response.into_body()).await;
    assert_eq!(first["total"], 17);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["data"].as_array().unwrap().len(), 15);
    assert_eq!(first["data"][0]["division"], "Division 16");
    assert_eq!(first["data"][0]["district_name_en"], "Colombo");

    let response = app
        .oneshot(test_request("GET", "/api/submissions?page=9"))
        .await
        .unwrap();
    let last = extract_json(response.into_body()).await;
    assert_eq!(last["page"], 2);
    assert_eq!(last["data"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Sports participation matrix
// =============================================================================

#[tokio::test]
async fn test_matrix_latest_non_draft_per_division() {
    let app = setup_app(setup_test_db().await);

    let mut older = submission(5, "Akurana", "submitted");
    older["team_sports"] = json!([{"sport_id": 51, "teams_male": 9}]);
    create(&app, older).await;

    let mut newer = submission(5, "Akurana", "submitted");
    newer["team_sports"] = json!([{"sport_id": 51, "teams_male": 2, "players_male": 20}]);
    create(&app, newer).await;

    let mut draft = submission(5, "Akurana", "draft");
    draft["team_sports"] = json!([{"sport_id": 51, "teams_male": 50}]);
    create(&app, draft).await;

    let body = matrix(&app, 5).await;

    assert_eq!(body["selected_district_id"], 5);
    assert_eq!(body["columns"].as_array().unwrap().len(), 14);
    assert_eq!(body["columns"][SWIMMING]["code"], "SW");
    assert_eq!(labels(&body), vec!["Akurana", "Total"]);
    let cell = &body["rows"][0]["cells"][KABADDI];
    assert_eq!(cell["men_teams"], 2);
    assert_eq!(cell["men_participants"], 20);
}

#[tokio::test]
async fn test_matrix_sums_swimming_rows_into_pseudo_sport() {
    let app = setup_app(setup_test_db().await);
    let mut body = submission(8, "Hikkaduwa", "submitted");
    body["swimming"] = json!([
        {"event_name": "50m", "players_male": 2},
        {"event_name": "100m", "players_male": 3},
        {"event_name": "relay"}
    ]);
    create(&app, body).await;

    let body = matrix(&app, 8).await;

    let cell = &body["rows"][0]["cells"][SWIMMING];
    assert_eq!(cell["men_participants"], 5);
    assert_eq!(body["rows"][1]["kind"], "total");
    assert_eq!(body["rows"][1]["cells"][SWIMMING]["men_participants"], 5);
}

#[tokio::test]
async fn test_matrix_pins_district_level_after_total() {
    let app = setup_app(setup_test_db().await);

    let mut district_level = submission(2, "", "submitted");
    district_level["entry_level"] = json!("district");
    district_level["team_sports"] = json!([{"sport_id": 51, "players_female": 7}]);
    create(&app, district_level).await;

    for division in ["Maharagama", "Dehiwala"] {
        let mut body = submission(2, division, "submitted");
        body["team_sports"] = json!([{"sport_id": 51, "teams_male": 1}]);
        create(&app, body).await;
    }

    let body = matrix(&app, 2).await;

    assert_eq!(
        labels(&body),
        vec!["Dehiwala", "Maharagama", "Total", DISTRICT_LEVEL_DIVISION]
    );
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows[3]["kind"], "district_level");
    assert_eq!(rows[2]["cells"][KABADDI]["men_teams"], 2);
}

#[tokio::test]
async fn test_matrix_empty_district_and_no_selection() {
    let app = setup_app(setup_test_db().await);
    create(&app, submission(9, "Weligama", "draft")).await;

    let body = matrix(&app, 9).await;
    assert_eq!(labels(&body), vec!["Total"]);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/reports/sports-matrix"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["selected_district_id"].is_null());
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    assert_eq!(body["districts"].as_array().unwrap().len(), 26);

    let response = app
        .oneshot(test_request("GET", "/api/reports/sports-matrix?district_id=404"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_print_view_renders_dashes() {
    let app = setup_app(setup_test_db().await);
    let mut body = submission(2, "Kesbewa", "submitted");
    body["team_sports"] = json!([{"sport_id": 51, "teams_male": 3}]);
    create(&app, body).await;

    let response = app
        .oneshot(test_request("GET", "/reports/sports-matrix/print?district_id=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert!(html.contains("District: Colombo"));
    assert!(html.contains("<td class=\"label\">Kesbewa</td><td>3</td><td>-</td>"));
}

#[tokio::test]
async fn test_workbook_export_has_one_sheet_per_district() {
    let app = setup_app(setup_test_db().await);
    let mut body = submission(2, "Kesbewa", "submitted");
    body["team_sports"] = json!([{"sport_id": 51, "teams_male": 3}]);
    create(&app, body).await;

    let response = app
        .oneshot(test_request("GET", "/reports/sports-matrix/export"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = read_bytes(response.into_body()).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Should be a zip archive");

    let mut workbook = String::new();
    archive
        .by_name("xl/workbook.xml")
        .unwrap()
        .read_to_string(&mut workbook)
        .unwrap();
    let names: Vec<&str> = workbook
        .split("<sheet name=\"")
        .skip(1)
        .filter_map(|s| s.split('"').next())
        .collect();
    assert_eq!(names.len(), 26);

    let colombo = names.iter().position(|n| *n == "Colombo").unwrap() + 1;
    let mut sheet = String::new();
    archive
        .by_name(&format!("xl/worksheets/sheet{}.xml", colombo))
        .unwrap()
        .read_to_string(&mut sheet)
        .unwrap();
    assert!(sheet.contains("<t>Kesbewa</t>"));
    assert!(sheet.contains(r#"<c r="B5" s="2"><v>3</v></c>"#));
}

#[tokio::test]
async fn test_bulk_export_one_page_per_submission() {
    let app = setup_app(setup_test_db().await);
    let first = create(&app, submission(2, "Kesbewa", "submitted")).await;
    let second = create(&app, submission(4, "Panadura", "draft")).await;

    let response = app
        .oneshot(test_request("GET", "/api/submissions/export"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = extract_text(response.into_body()).await;
    assert_eq!(html.matches("<section class=\"page\">").count(), 2);
    assert!(html.contains(&format!("| ID: {}</div>", first)));
    assert!(html.contains(&format!("| ID: {}</div>", second)));
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_counts() {
    let app = setup_app(setup_test_db().await);
    create(&app, submission(2, "Kesbewa", "submitted")).await;
    create(&app, submission(2, "Kesbewa", "draft")).await;
    create(&app, submission(2, "Homagama", "draft")).await;
    create(&app, submission(6, "Dambulla", "submitted")).await;

    let response = app.oneshot(test_request("GET", "/api/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["stats"]["total_submissions"], 4);
    assert_eq!(body["stats"]["districts_active"], 2);
    assert_eq!(body["stats"]["divisions_active"], 3);
    let top = &body["district_stats"][0];
    assert_eq!(top["id"], 2);
    assert_eq!(top["submissions_count"], 3);
    assert_eq!(top["division_breakdown"][0]["division"], "Kesbewa");
    assert_eq!(top["division_breakdown"][0]["count"], 2);
}

// =============================================================================
// Division analysis
// =============================================================================

#[tokio::test]
async fn test_analysis_status_unreachable() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/api/division-analysis/status"))
        .await
        .unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["available"], false);
    assert_eq!(body["url"], UNREACHABLE);
    assert_eq!(body["configured_model"], "llama2");
}

#[tokio::test]
async fn test_analyze_unavailable_is_503() {
    let app = setup_app(setup_test_db().await);
    create(&app, submission(2, "Kesbewa", "submitted")).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/division-analysis/analyze",
            &json!({"district_id": 2, "division": "Kesbewa"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

async fn llm_server(generated: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"models": [{"name": "llama2"}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": generated})))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_analyze_success_and_missing_division() {
    let server = llm_server("Strong male turnout in team sports.").await;
    let app = setup_app_with(setup_test_db().await, &server.uri());
    let mut body = submission(2, "Kesbewa", "draft");
    body["team_sports"] = json!([{"sport_id": 51, "players_male": 12, "players_female": 4}]);
    create(&app, body).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/division-analysis/analyze",
            &json!({"district_id": 2, "division": "Kesbewa"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"], "Strong male turnout in team sports.");
    assert_eq!(body["stats"]["total_submissions"], 1);
    assert_eq!(body["stats"]["total_participants"], 16);
    assert_eq!(body["stats"]["district_name"], "Colombo");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/division-analysis/analyze",
            &json!({"district_id": 2, "division": "Nowhere"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["message"], "No data available for this division");
}

#[tokio::test]
async fn test_analyze_empty_generation_is_500() {
    let server = llm_server("").await;
    let app = setup_app_with(setup_test_db().await, &server.uri());
    create(&app, submission(2, "Kesbewa", "submitted")).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/division-analysis/analyze",
            &json!({"district_id": 2, "division": "Kesbewa"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_analyze_validates_request() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/division-analysis/analyze",
            &json!({"division": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert!(body["errors"]["district_id"].is_array());
    assert!(body["errors"]["division"].is_array());
}
