//! Health Check Handler

use axum::Json;

/// GET /health
/// Simple liveness probe.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
