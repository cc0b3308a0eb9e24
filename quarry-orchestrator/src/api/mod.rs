//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod extract;
pub mod health;
pub mod runs;
pub mod schedules;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::executor::RunExecutor;
use crate::scheduler::Scheduler;
use crate::store::RunStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RunStore>,
    pub executor: Arc<RunExecutor>,
    pub scheduler: Arc<Scheduler>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Run endpoints
        .route("/run", post(runs::submit_run))
        .route("/jobs", get(runs::list_runs))
        .route("/jobs/{id}", get(runs::get_run))
        .route("/jobs/{id}/cancel", post(runs::cancel_run))
        // Schedule endpoints
        .route("/schedules", post(schedules::upsert_schedule))
        .route("/schedules", get(schedules::list_schedules))
        .route("/schedules/{key}", delete(schedules::delete_schedule))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use quarry_core::domain::RunStatus;
    use crate::provider::SimulatedProvider;
    use crate::store::MemoryRunStore;

    fn app() -> Router {
        let store: Arc<dyn RunStore> = Arc::new(MemoryRunStore::new());
        let executor = Arc::new(RunExecutor::new(
            store.clone(),
            Arc::new(SimulatedProvider::new()),
        ));
        let scheduler = Arc::new(Scheduler::new(store.clone(), executor.clone()));
        create_router(AppState {
            store,
            executor,
            scheduler,
        })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_input() -> serde_json::Value {
        serde_json::json!({
            "seeds": ["invoice automation"],
            "market": "US",
            "competitors": ["bill.com"],
            "cpcRange": { "min": 1.0, "max": 15.0 }
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_submit_run_returns_job_id() {
        let response = app()
            .oneshot(post_json("/run", valid_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert!(body.get("jobId").is_some());
    }

    #[tokio::test]
    async fn test_submit_invalid_input_gets_error_envelope() {
        let response = app()
            .oneshot(post_json(
                "/run",
                serde_json::json!({
                    "seeds": [],
                    "market": "US",
                    "cpcRange": { "min": 1.0, "max": 15.0 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("seed"));
    }

    #[tokio::test]
    async fn test_malformed_json_body_gets_error_envelope() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/run")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not valid json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_query_string_gets_error_envelope() {
        let response = app().oneshot(get("/jobs?limit=abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_list_limit_zero_is_an_empty_page() {
        let app = app();
        app.clone()
            .oneshot(post_json("/run", valid_input()))
            .await
            .unwrap();

        let response = app.oneshot(get("/jobs?limit=0")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["runs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_run_is_404_with_envelope() {
        let response = app()
            .oneshot(get("/jobs/00000000-0000-0000-0000-000000000001"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_malformed_run_id_is_400_with_envelope() {
        let response = app().oneshot(get("/jobs/not-a-uuid")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("invalid run id"));
    }

    #[tokio::test]
    async fn test_submit_then_poll_until_terminal() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json("/run", valid_input()))
            .await
            .unwrap();
        let job_id = body_json(response).await["jobId"]
            .as_str()
            .unwrap()
            .to_string();

        let mut last_status = String::new();
        for _ in 0..100 {
            let response = app
                .clone()
                .oneshot(get(&format!("/jobs/{job_id}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let run = body_json(response).await;
            last_status = run["status"].as_str().unwrap().to_string();
            if last_status == "completed" || last_status == "failed" {
                // Terminal snapshots expose exactly one of result/error.
                assert_ne!(run["result"].is_null(), run["error"].is_null());
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert_eq!(last_status, "completed");
    }

    #[tokio::test]
    async fn test_list_runs_scoped_by_product() {
        let app = app();
        let mut input = valid_input();
        input["productId"] = serde_json::json!("prod-7");
        app.clone()
            .oneshot(post_json("/run", input))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get("/jobs?productId=prod-7&limit=5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["runs"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get("/jobs?productId=other&limit=5"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["runs"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_upsert_list_delete_cycle() {
        let app = app();
        let mut body = valid_input();
        body["key"] = serde_json::json!("weekly-us");
        body["cron"] = serde_json::json!("0 6 * * 1");

        let response = app
            .clone()
            .oneshot(post_json("/schedules", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ack = body_json(response).await;
        assert_eq!(ack["key"], "weekly-us");
        assert_eq!(ack["timezone"], "UTC");

        // Upsert again: still exactly one schedule.
        body["cron"] = serde_json::json!("0 7 * * 2");
        app.clone()
            .oneshot(post_json("/schedules", body))
            .await
            .unwrap();

        let response = app.clone().oneshot(get("/schedules")).await.unwrap();
        let listed = body_json(response).await;
        let schedules = listed["schedules"].as_array().unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0]["cron"], "0 7 * * 2");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/schedules/weekly-us")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Deleting again stays silent.
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/schedules/weekly-us")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_schedule_bad_cron_is_400() {
        let mut body = valid_input();
        body["key"] = serde_json::json!("broken");
        body["cron"] = serde_json::json!("every other tuesday");

        let response = app().oneshot(post_json("/schedules", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let envelope = body_json(response).await;
        assert!(envelope["error"].as_str().unwrap().contains("cron"));
    }

    #[tokio::test]
    async fn test_cancel_unknown_run_is_404() {
        let response = app()
            .oneshot(post_json(
                "/jobs/00000000-0000-0000-0000-000000000001/cancel",
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_run_status_spellings_match_contract() {
        // The polling contract promises these exact strings.
        for (status, expected) in [
            (RunStatus::Queued, "queued"),
            (RunStatus::Completed, "completed"),
            (RunStatus::Failed, "failed"),
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap().as_str().unwrap(),
                expected
            );
        }
    }
}
