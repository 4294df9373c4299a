//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

pub mod http;

/// CORS for the configured origins; an empty list allows any origin.
fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let origin = if allow_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = allow_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(target: "assessment_backend", origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with:
/// - Problem catalog CRUD under `/api/problems`
/// - Assessment generation at `/api/assessments/generate`
/// - CORS from config
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>, allow_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(http::http_health))
        .route(
            "/api/problems",
            get(http::http_list_problems).post(http::http_create_problem),
        )
        .route(
            "/api/problems/:id",
            get(http::http_get_problem)
                .put(http::http_update_problem)
                .delete(http::http_delete_problem),
        )
        .route("/api/assessments/generate", post(http::http_generate_assessment))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(cors_layer(allow_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::ProblemStore;
    use crate::seeds::seed_problems;

    fn app_with(store: ProblemStore) -> Router {
        build_router(Arc::new(AppState::with_catalog(store)), &[])
    }

    fn app() -> Router {
        app_with(ProblemStore::in_memory(seed_problems()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn generate_body(goals: Value, strategy: &str, minutes: i64) -> Value {
        json!({
            "student_profile": {
                "id": "student-1",
                "current_level": "grade-8",
                "learning_goals": goals,
            },
            "assessment_request": {
                "max_total_time_minutes": minutes,
                "pedagogical_strategy": strategy,
            }
        })
    }

    #[tokio::test]
    async fn health() {
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
    }

    #[tokio::test]
    async fn list_respects_skip_and_limit() {
        let req = Request::builder().uri("/api/problems?skip=2&limit=3").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        let ids: Vec<&str> = list.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["alg-003", "alg-004", "alg-005"]);
    }

    #[tokio::test]
    async fn create_get_delete_roundtrip() {
        let app = app();
        let problem = json!({
            "id": "stat-001",
            "text": "Find the mean of 2, 4, 9.",
            "topic": "Statistics",
            "difficulty": 2,
            "estimated_time_to_solve_minutes": 3
        });

        let response = app.clone().oneshot(json_request("POST", "/api/problems", problem.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, problem);

        let response = app.clone().oneshot(json_request("POST", "/api/problems", problem.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].as_str().unwrap().contains("already exists"));

        let req = Request::builder().uri("/api/problems/stat-001").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let req = Request::builder().method("DELETE").uri("/api/problems/stat-001").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let req = Request::builder().uri("/api/problems/stat-001").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["detail"], "Problem not found");
    }

    #[tokio::test]
    async fn update_unknown_problem_is_404_and_bad_difficulty_is_422() {
        let app = app();
        let ghost = json!({
            "id": "ghost", "text": "?", "topic": "Algebra",
            "difficulty": 3, "estimated_time_to_solve_minutes": 2
        });
        let response = app.clone().oneshot(json_request("PUT", "/api/problems/ghost", ghost)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bad = json!({
            "id": "alg-001", "text": "x", "topic": "Algebra",
            "difficulty": 7, "estimated_time_to_solve_minutes": 2
        });
        let response = app.oneshot(json_request("PUT", "/api/problems/alg-001", bad)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn generate_returns_linked_plan_and_assessment() {
        let body = generate_body(json!(["Algebra", "Geometry"]), "REVIEW", 30);
        let response = app().oneshot(json_request("POST", "/api/assessments/generate", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let out = body_json(response).await;
        let plan = &out["planner_output"]["assessment_plan"];
        assert_eq!(plan["selected_topics"], json!(["Algebra", "Geometry"]));
        assert_eq!(plan["difficulty_distribution"], json!({"easy": 60, "medium": 35, "hard": 5}));
        assert_eq!(plan["num_questions"], 6);
        assert_eq!(plan["target_total_time"], 30);
        assert_eq!(out["planner_output"]["plan_id"], out["executor_output"]["plan_id"]);
        assert!(out["executor_output"]["total_estimated_time"].as_u64().unwrap() <= 30);
        assert_eq!(out["executor_output"]["metadata"]["target_time"], "30");
        assert!(out["generated_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn generate_with_empty_catalog_is_ok_and_empty() {
        let body = generate_body(json!([]), "CHALLENGE", 25);
        let response = app_with(ProblemStore::in_memory(vec![]))
            .oneshot(json_request("POST", "/api/assessments/generate", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let out = body_json(response).await;
        assert_eq!(out["executor_output"]["problems"], json!([]));
        assert_eq!(out["executor_output"]["total_estimated_time"], 0);
        assert_eq!(out["planner_output"]["assessment_plan"]["selected_topics"], json!(["General Math"]));
    }

    #[tokio::test]
    async fn malformed_payload_is_422_with_detail() {
        let body = json!({ "student_profile": { "id": "s" } });
        let response = app().oneshot(json_request("POST", "/api/assessments/generate", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Invalid payload"), "{detail}");
    }

    #[tokio::test]
    async fn unreadable_catalog_is_503_not_empty_assessment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ProblemSet.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();
        let store = ProblemStore::open(&path).unwrap();

        let body = generate_body(json!(["Algebra"]), "REVIEW", 30);
        let response = app_with(store)
            .oneshot(json_request("POST", "/api/assessments/generate", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn catalog_work_runs_off_the_runtime_thread() {
        let state = Arc::new(AppState::with_catalog(ProblemStore::in_memory(seed_problems())));
        let runtime_thread = std::thread::current().id();
        let (worker, count) = http::blocking(&state, |s| Ok((std::thread::current().id(), s.catalog.len()?)))
            .await
            .unwrap();
        assert_ne!(worker, runtime_thread);
        assert_eq!(count, seed_problems().len());
    }

    #[tokio::test]
    async fn panicking_catalog_work_is_500() {
        let state = Arc::new(AppState::with_catalog(ProblemStore::in_memory(vec![])));
        let err = http::blocking(&state, |_| -> Result<(), crate::error::ApiError> { panic!("boom") })
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
