//! Pipeline run domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::input::PipelineJobInput;
use crate::domain::result::PipelineResult;

/// Lifecycle status of a pipeline run.
///
/// Statuses advance strictly forward along the declared order, with `Failed`
/// reachable from any non-terminal state. `Queued` is the only initial
/// state; `Completed` and `Failed` are the only terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Expanding,
    Analyzing,
    Scoring,
    Reporting,
    Completed,
    Failed,
}

impl RunStatus {
    /// True once a run can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// True while a run is actively progressing through stages.
    pub fn is_active(self) -> bool {
        !self.is_terminal() && self != RunStatus::Queued
    }

    /// Position in the fixed stage order, used to assert monotonic
    /// progression. `Failed` sorts last alongside `Completed` since both
    /// are terminal.
    pub fn ordinal(self) -> u8 {
        match self {
            RunStatus::Queued => 0,
            RunStatus::Expanding => 1,
            RunStatus::Analyzing => 2,
            RunStatus::Scoring => 3,
            RunStatus::Reporting => 4,
            RunStatus::Completed => 5,
            RunStatus::Failed => 5,
        }
    }
}

/// One execution of the keyword-research pipeline.
///
/// Owned by the job store for its whole lifetime; the stage executor holds
/// only a transient lease while advancing it. `result` and `error` are
/// mutually exclusive and stay null until a terminal status is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: Uuid,
    pub product_id: Option<String>,
    pub status: RunStatus,
    /// Free-text note describing the last successfully entered stage.
    pub stage_detail: Option<String>,
    /// Immutable snapshot of the submitted input.
    pub config: PipelineJobInput,
    pub result: Option<PipelineResult>,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl PipelineRun {
    /// Creates a fresh queued run from a validated input snapshot.
    pub fn new(config: PipelineJobInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: config.product_id.clone(),
            status: RunStatus::Queued,
            stage_detail: None,
            config,
            result: None,
            error: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::CpcRange;

    fn input() -> PipelineJobInput {
        PipelineJobInput {
            seeds: vec!["invoice automation".to_string()],
            market: "US".to_string(),
            competitors: vec!["bill.com".to_string()],
            cpc_range: CpcRange { min: 1.0, max: 15.0 },
            product_id: Some("prod-1".to_string()),
            product: None,
        }
    }

    #[test]
    fn test_new_run_is_queued_and_empty() {
        let run = PipelineRun::new(input());
        assert_eq!(run.status, RunStatus::Queued);
        assert_eq!(run.product_id.as_deref(), Some("prod-1"));
        assert!(run.result.is_none());
        assert!(run.error.is_none());
        assert!(run.started_at.is_none());
        assert!(run.completed_at.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Reporting.is_terminal());
    }

    #[test]
    fn test_ordinals_are_monotonic_along_stage_order() {
        let order = [
            RunStatus::Queued,
            RunStatus::Expanding,
            RunStatus::Analyzing,
            RunStatus::Scoring,
            RunStatus::Reporting,
            RunStatus::Completed,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].ordinal() < pair[1].ordinal());
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&RunStatus::Expanding).unwrap();
        assert_eq!(json, "\"expanding\"");
    }
}
