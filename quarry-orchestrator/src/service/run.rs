//! Run Service
//!
//! Business logic for run submission, observation, and cancellation.

use std::sync::Arc;

use uuid::Uuid;

use quarry_core::domain::{PipelineJobInput, PipelineRun};

use crate::executor::RunExecutor;
use crate::store::{RunFilter, RunStore, StoreError};

/// Default and maximum caps for run listings.
const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 200;

/// Service error type.
#[derive(Debug)]
pub enum RunError {
    Invalid(String),
    NotFound(Uuid),
    AlreadyTerminal(Uuid),
    Store(StoreError),
}

impl From<StoreError> for RunError {
    fn from(err: StoreError) -> Self {
        RunError::Store(err)
    }
}

/// Validates the input, creates a queued run, and hands it to the
/// executor.
pub async fn submit_run(
    store: &Arc<dyn RunStore>,
    executor: &Arc<RunExecutor>,
    input: PipelineJobInput,
) -> Result<PipelineRun, RunError> {
    input.validate().map_err(RunError::Invalid)?;

    let run = PipelineRun::new(input);
    store.create(run.clone()).await?;

    tracing::info!("Run created: {}", run.id);
    executor.spawn(run.id);

    Ok(run)
}

/// Current snapshot of a run.
pub async fn get_run(store: &Arc<dyn RunStore>, id: Uuid) -> Result<PipelineRun, RunError> {
    store.get(id).await?.ok_or(RunError::NotFound(id))
}

/// Lists runs newest-first, optionally scoped to a product.
///
/// The caller's limit is always honored as a hard cap; `limit=0` yields an
/// empty page rather than falling through to an unbounded listing.
pub async fn list_runs(
    store: &Arc<dyn RunStore>,
    product_id: Option<String>,
    limit: Option<usize>,
) -> Result<Vec<PipelineRun>, RunError> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let runs = store
        .list(RunFilter {
            product_id,
            limit: Some(limit),
        })
        .await?;
    Ok(runs)
}

/// Flags a run for cooperative cancellation.
pub async fn cancel_run(
    store: &Arc<dyn RunStore>,
    executor: &Arc<RunExecutor>,
    id: Uuid,
) -> Result<(), RunError> {
    let run = store.get(id).await?.ok_or(RunError::NotFound(id))?;
    if run.status.is_terminal() {
        return Err(RunError::AlreadyTerminal(id));
    }

    // The run can still reach terminal between the check above and the
    // flag; the executor re-checks and reports that case.
    if !executor.cancel(id).await? {
        return Err(RunError::AlreadyTerminal(id));
    }
    tracing::info!("Run {} flagged for cancellation", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::domain::{CpcRange, RunStatus};
    use crate::provider::SimulatedProvider;
    use crate::store::MemoryRunStore;

    fn deps() -> (Arc<dyn RunStore>, Arc<RunExecutor>) {
        let store: Arc<dyn RunStore> = Arc::new(MemoryRunStore::new());
        let executor = Arc::new(RunExecutor::new(
            store.clone(),
            Arc::new(SimulatedProvider::new()),
        ));
        (store, executor)
    }

    fn input() -> PipelineJobInput {
        PipelineJobInput {
            seeds: vec!["payroll software".to_string()],
            market: "US".to_string(),
            competitors: vec![],
            cpc_range: CpcRange { min: 1.0, max: 15.0 },
            product_id: None,
            product: None,
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_input() {
        let (store, executor) = deps();
        let mut bad = input();
        bad.seeds.clear();

        let result = submit_run(&store, &executor, bad).await;
        assert!(matches!(result, Err(RunError::Invalid(_))));
        assert!(store.list(RunFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_creates_queued_run() {
        let (store, executor) = deps();
        let run = submit_run(&store, &executor, input()).await.unwrap();
        assert!(store.get(run.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_limit_zero_returns_no_runs() {
        let (store, executor) = deps();
        submit_run(&store, &executor, input()).await.unwrap();

        let runs = list_runs(&store, None, Some(0)).await.unwrap();
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_run_is_not_found() {
        let (store, _) = deps();
        assert!(matches!(
            get_run(&store, Uuid::new_v4()).await,
            Err(RunError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_terminal_run_rejected() {
        let (store, executor) = deps();
        let mut run = PipelineRun::new(input());
        run.status = RunStatus::Completed;
        let id = run.id;
        store.create(run).await.unwrap();

        assert!(matches!(
            cancel_run(&store, &executor, id).await,
            Err(RunError::AlreadyTerminal(_))
        ));
    }
}
