//! Recurring schedule domain types

use serde::{Deserialize, Serialize};

use crate::domain::input::PipelineJobInput;

/// A recurring pipeline definition.
///
/// `key` is user-chosen and unique; re-submitting the same key replaces the
/// prior cron/config rather than duplicating it. Each firing creates a
/// brand-new, independently owned run from the stored `input`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSchedule {
    pub key: String,
    /// Standard five-field cron expression (a seconds field is accepted
    /// but not required).
    pub cron: String,
    /// IANA timezone the cron expression is evaluated in.
    pub timezone: String,
    pub input: PipelineJobInput,
}
