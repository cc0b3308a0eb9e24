//! DTOs for the orchestrator HTTP API
//!
//! Request/response envelopes shared between the orchestrator handlers and
//! the typed client. Field spellings here are the wire contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::input::PipelineJobInput;
use crate::domain::run::PipelineRun;
use crate::domain::schedule::PipelineSchedule;

/// Response to `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSubmitted {
    pub job_id: Uuid,
}

/// Response to `GET /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunList {
    pub runs: Vec<PipelineRun>,
}

/// Request body for `POST /schedules`: the job input plus the schedule
/// envelope, flattened into one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedule {
    pub key: String,
    pub cron: String,
    /// IANA timezone; defaults to UTC when omitted.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub input: PipelineJobInput,
}

/// Response to `POST /schedules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAck {
    pub key: String,
    pub cron: String,
    pub timezone: String,
}

/// Response to `GET /schedules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleList {
    pub schedules: Vec<PipelineSchedule>,
}
