//! Run API Handlers
//!
//! HTTP endpoints for run submission and observation. These are the whole
//! polling contract: callers see status snapshots, never internal stage
//! mechanics.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use quarry_core::domain::{PipelineJobInput, PipelineRun};
use quarry_core::dto::{RunList, RunSubmitted};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{Json, Query};
use crate::service::run as run_service;

/// POST /run
/// Validate input and launch a new pipeline run.
pub async fn submit_run(
    State(state): State<AppState>,
    Json(input): Json<PipelineJobInput>,
) -> ApiResult<(StatusCode, Json<RunSubmitted>)> {
    tracing::info!(
        "Submitting run ({} seeds, market {})",
        input.seeds.len(),
        input.market
    );

    let run = run_service::submit_run(&state.store, &state.executor, input).await?;

    Ok((StatusCode::CREATED, Json(RunSubmitted { job_id: run.id })))
}

/// GET /jobs/{id}
/// Current snapshot of a run.
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PipelineRun>> {
    let id = parse_run_id(&id)?;
    tracing::debug!("Getting run: {}", id);

    let run = run_service::get_run(&state.store, id).await?;
    Ok(Json(run))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRunsQuery {
    pub product_id: Option<String>,
    pub limit: Option<usize>,
}

/// GET /jobs?productId=&limit=
/// List runs newest-first.
pub async fn list_runs(
    State(state): State<AppState>,
    Query(params): Query<ListRunsQuery>,
) -> ApiResult<Json<RunList>> {
    tracing::debug!("Listing runs (product: {:?})", params.product_id);

    let runs = run_service::list_runs(&state.store, params.product_id, params.limit).await?;
    Ok(Json(RunList { runs }))
}

/// POST /jobs/{id}/cancel
/// Flag a run for cooperative cancellation.
pub async fn cancel_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_run_id(&id)?;
    tracing::info!("Cancelling run: {}", id);

    run_service::cancel_run(&state.store, &state.executor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parses the path id by hand so malformed ids get the JSON error envelope
/// rather than axum's plain-text rejection.
fn parse_run_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid run id: {raw}")))
}
