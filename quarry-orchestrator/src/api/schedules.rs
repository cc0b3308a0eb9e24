//! Schedule API Handlers
//!
//! HTTP endpoints for recurring-schedule management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use quarry_core::dto::{CreateSchedule, ScheduleAck, ScheduleList};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::Json;
use crate::service::schedule as schedule_service;

/// POST /schedules
/// Upsert a schedule by key.
pub async fn upsert_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateSchedule>,
) -> ApiResult<Json<ScheduleAck>> {
    tracing::info!("Upserting schedule: {:?}", req.key);

    let schedule = schedule_service::upsert_schedule(&state.scheduler, req).await?;

    Ok(Json(ScheduleAck {
        key: schedule.key,
        cron: schedule.cron,
        timezone: schedule.timezone,
    }))
}

/// GET /schedules
/// List all registered schedules.
pub async fn list_schedules(State(state): State<AppState>) -> ApiResult<Json<ScheduleList>> {
    let schedules = schedule_service::list_schedules(&state.scheduler).await;
    Ok(Json(ScheduleList { schedules }))
}

/// DELETE /schedules/{key}
/// Idempotent removal; absent keys are not an error.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting schedule: {:?}", key);

    schedule_service::delete_schedule(&state.scheduler, &key).await;
    Ok(StatusCode::NO_CONTENT)
}
