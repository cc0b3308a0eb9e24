//! Schedule Service
//!
//! Business logic for recurring-schedule management.

use std::sync::Arc;

use quarry_core::domain::PipelineSchedule;
use quarry_core::dto::CreateSchedule;

use crate::scheduler::{Scheduler, SchedulerError};

const DEFAULT_TIMEZONE: &str = "UTC";

/// Service error type.
#[derive(Debug)]
pub enum ScheduleError {
    Invalid(String),
    Scheduler(SchedulerError),
}

impl From<SchedulerError> for ScheduleError {
    fn from(err: SchedulerError) -> Self {
        ScheduleError::Scheduler(err)
    }
}

/// Validates the request and upserts the schedule by key.
pub async fn upsert_schedule(
    scheduler: &Arc<Scheduler>,
    req: CreateSchedule,
) -> Result<PipelineSchedule, ScheduleError> {
    if req.key.trim().is_empty() {
        return Err(ScheduleError::Invalid(
            "schedule key must not be blank".to_string(),
        ));
    }
    req.input.validate().map_err(ScheduleError::Invalid)?;

    let schedule = PipelineSchedule {
        key: req.key,
        cron: req.cron,
        timezone: req.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        input: req.input,
    };

    let schedule = scheduler.upsert(schedule).await?;
    Ok(schedule)
}

pub async fn list_schedules(scheduler: &Arc<Scheduler>) -> Vec<PipelineSchedule> {
    scheduler.list().await
}

/// Idempotent removal; absent keys are not an error.
pub async fn delete_schedule(scheduler: &Arc<Scheduler>, key: &str) {
    scheduler.remove(key).await;
}
