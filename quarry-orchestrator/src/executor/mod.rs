//! Stage executor
//!
//! Drives a pipeline run through its fixed stage order, calling the
//! provider gateway and the pure engines, and persisting every transition
//! before the next stage body starts. A crash mid-stage therefore leaves
//! the run visibly stuck at its last entered stage rather than silently
//! lost.
//!
//! Each run executes as its own spawned task; stages within a run are
//! strictly sequential because each consumes the prior stage's output.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use quarry_core::domain::{
    CompetitorListings, KeywordMetrics, PipelineResult, PipelineRun, RunStatus, ScoredKeyword,
};
use quarry_core::gap::detect_gaps;
use quarry_core::scoring::{ScoringPolicy, score_keyword};

use crate::provider::{KeywordProvider, ProviderError};
use crate::store::{RunStore, StoreError};

/// Bounded-retry policy for transient provider failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per retry.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

/// Internal stage failure; converted into the run's terminal `error`.
#[derive(Debug, Error)]
enum StageError {
    #[error("run cancelled by caller")]
    Cancelled,

    #[error("{0}")]
    Provider(ProviderError),

    #[error("{0}")]
    Insufficient(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Executes pipeline runs, one spawned task per run.
pub struct RunExecutor {
    store: Arc<dyn RunStore>,
    provider: Arc<dyn KeywordProvider>,
    policy: ScoringPolicy,
    retry: RetryPolicy,
    /// Runs flagged for cooperative cancellation; checked at every stage
    /// boundary.
    cancellations: Mutex<HashSet<Uuid>>,
}

impl RunExecutor {
    pub fn new(store: Arc<dyn RunStore>, provider: Arc<dyn KeywordProvider>) -> Self {
        Self {
            store,
            provider,
            policy: ScoringPolicy::default(),
            retry: RetryPolicy::default(),
            cancellations: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Launches a run on its own task (fire-and-forget).
    pub fn spawn(self: &Arc<Self>, run_id: Uuid) {
        let executor = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = executor.execute(run_id).await {
                error!("Run {} aborted with store failure: {}", run_id, e);
            }
        });
    }

    /// Requests cooperative cancellation; honored at the next stage
    /// boundary, never by aborting an in-flight provider call.
    ///
    /// Returns false when the run is missing or already terminal. The flag
    /// is inserted before the store check: a run that goes terminal in
    /// between has already swept its flags, so the stale entry is removed
    /// here instead of accumulating.
    pub async fn cancel(&self, run_id: Uuid) -> Result<bool, StoreError> {
        self.cancellations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(run_id);

        match self.store.get(run_id).await? {
            Some(run) if !run.status.is_terminal() => Ok(true),
            _ => {
                self.clear_cancellation(run_id);
                Ok(false)
            }
        }
    }

    fn is_cancelled(&self, run_id: Uuid) -> bool {
        self.cancellations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&run_id)
    }

    fn clear_cancellation(&self, run_id: Uuid) {
        self.cancellations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&run_id);
    }

    /// Drives one run to a terminal status. Only store failures escape;
    /// every other failure mode lands in the run's `error` field.
    pub async fn execute(&self, run_id: Uuid) -> Result<(), StoreError> {
        let Some(mut run) = self.store.get(run_id).await? else {
            warn!("Run {} not found, nothing to execute", run_id);
            return Ok(());
        };
        if run.status.is_terminal() {
            warn!("Run {} is already terminal, skipping", run_id);
            return Ok(());
        }

        info!("Executing run {} ({} seeds)", run_id, run.config.seeds.len());

        match self.run_stages(&mut run).await {
            Ok(result) => {
                run.status = RunStatus::Completed;
                run.stage_detail = Some(format!(
                    "completed: {} keywords, {} gaps",
                    result.keywords.len(),
                    result.gaps.len()
                ));
                run.result = Some(result);
                run.completed_at = Some(chrono::Utc::now());
                self.store.update(run).await?;
                info!("Run {} completed", run_id);
            }
            Err(StageError::Store(e)) => {
                self.clear_cancellation(run_id);
                return Err(e);
            }
            Err(e) => {
                run.status = RunStatus::Failed;
                run.error = Some(e.to_string());
                run.completed_at = Some(chrono::Utc::now());
                self.store.update(run).await?;
                info!("Run {} failed: {}", run_id, e);
            }
        }

        self.clear_cancellation(run_id);
        Ok(())
    }

    async fn run_stages(&self, run: &mut PipelineRun) -> Result<PipelineResult, StageError> {
        let seeds = run.config.seeds.clone();
        let market = run.config.market.clone();
        let range = run.config.cpc_range;

        // Stage: expanding.
        self.advance(run, RunStatus::Expanding, "expanding seed keyword universe")
            .await?;

        let expanded = self
            .with_retry("keyword expansion", || {
                self.provider.expand(&seeds, &market)
            })
            .await?;

        let mut listings: Vec<CompetitorListings> = Vec::new();
        for domain in &run.config.competitors {
            let competitor = self
                .with_retry("competitor listings", || {
                    self.provider.competitor_listings(domain, &seeds, &market)
                })
                .await?;
            listings.push(competitor);
        }

        // Candidate set for scoring: seeds plus expansions, first
        // occurrence wins.
        let candidates = merge_unique(seeds.iter().chain(expanded.iter()));
        if candidates.is_empty() {
            return Err(StageError::Insufficient(
                "keyword expansion produced no candidates".to_string(),
            ));
        }

        // Stage: analyzing. Metrics cover the candidate set plus every
        // keyword the competitors rank for, so the gap detector can
        // classify competitor-only terms later.
        self.advance(
            run,
            RunStatus::Analyzing,
            &format!("analyzing {} candidate keywords", candidates.len()),
        )
        .await?;

        let universe = merge_unique(
            candidates
                .iter()
                .chain(listings.iter().flat_map(competitor_keywords)),
        );
        let metrics = self
            .with_retry("keyword metrics", || {
                self.provider.keyword_metrics(&universe, &market)
            })
            .await?;

        let metrics_by_keyword: HashMap<String, KeywordMetrics> = metrics
            .into_iter()
            .map(|m| (m.keyword.clone(), m))
            .collect();

        // CPC cost-control: candidates priced outside the configured range
        // are dropped before scoring.
        let candidate_set: HashSet<&String> = candidates.iter().collect();
        let scorable: Vec<&KeywordMetrics> = universe
            .iter()
            .filter(|k| candidate_set.contains(*k))
            .filter_map(|k| metrics_by_keyword.get(k))
            .filter(|m| range.contains(m.cpc))
            .collect();

        if scorable.is_empty() {
            return Err(StageError::Insufficient(format!(
                "no candidate keywords survived CPC filtering (range {:.2}-{:.2})",
                range.min, range.max
            )));
        }

        // Stage: scoring.
        self.advance(
            run,
            RunStatus::Scoring,
            &format!("scoring {} keywords", scorable.len()),
        )
        .await?;

        let mut scored: Vec<ScoredKeyword> = scorable
            .iter()
            .map(|m| score_keyword(m, &range, &self.policy))
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Stage: reporting.
        self.advance(
            run,
            RunStatus::Reporting,
            "detecting competitor gaps and assembling report",
        )
        .await?;

        let gaps = detect_gaps(&scored, &listings, &metrics_by_keyword, &self.policy);

        let generated_at = chrono::Utc::now();
        let duration_ms = run
            .started_at
            .map(|started| (generated_at - started).num_milliseconds().max(0) as u64)
            .unwrap_or(0);

        Ok(PipelineResult::assemble(
            scored,
            gaps,
            &run.config,
            generated_at,
            duration_ms,
        ))
    }

    /// Persists a stage transition before its stage body runs. The
    /// cancellation flag is honored here, at the stage boundary.
    async fn advance(
        &self,
        run: &mut PipelineRun,
        status: RunStatus,
        detail: &str,
    ) -> Result<(), StageError> {
        if self.is_cancelled(run.id) {
            return Err(StageError::Cancelled);
        }
        run.status = status;
        run.stage_detail = Some(detail.to_string());
        if run.started_at.is_none() {
            run.started_at = Some(chrono::Utc::now());
        }
        self.store.update(run.clone()).await?;
        Ok(())
    }

    /// Retries a provider call on transient failures with exponential
    /// backoff; permanent failures and exhausted retries surface as-is.
    async fn with_retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, StageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.base_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "{} failed transiently (attempt {}/{}), retrying in {:?}: {}",
                        label, attempt, self.retry.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(StageError::Provider(e)),
            }
        }
    }
}

/// Deduplicates keywords preserving first-occurrence order.
fn merge_unique<'a, I: Iterator<Item = &'a String>>(keywords: I) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for keyword in keywords {
        if seen.insert(keyword.as_str()) {
            unique.push(keyword.clone());
        }
    }
    unique
}

fn competitor_keywords(listings: &CompetitorListings) -> impl Iterator<Item = &String> {
    listings
        .organic
        .iter()
        .chain(listings.paid.iter())
        .map(|l| &l.keyword)
}
