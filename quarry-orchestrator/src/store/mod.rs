//! Job store
//!
//! Durable record of every pipeline run. The executor and the scheduler are
//! written against the [`RunStore`] trait and receive an implementation by
//! injection, which keeps concurrent tests isolated from each other.
//!
//! A run record is always written whole: the executor is the single writer
//! per run, so replacing the record under the store's lock (or in one SQL
//! statement) keeps partial updates invisible to concurrent readers.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRunStore;
pub use sqlite::SqliteRunStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use quarry_core::domain::PipelineRun;

/// Store failure modes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run {0} not found")]
    Missing(Uuid),

    #[error("run {0} already exists")]
    Duplicate(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt run record: {0}")]
    Corrupt(String),
}

/// Filter for listing runs. Results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub product_id: Option<String>,
    /// Maximum number of runs to return; `None` means no cap.
    pub limit: Option<usize>,
}

/// Durable CRUD over pipeline runs, keyed by opaque id.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn create(&self, run: PipelineRun) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<PipelineRun>, StoreError>;

    /// Lists runs newest-first, optionally filtered by product and capped.
    async fn list(&self, filter: RunFilter) -> Result<Vec<PipelineRun>, StoreError>;

    /// Replaces the stored record for an existing run.
    async fn update(&self, run: PipelineRun) -> Result<(), StoreError>;
}
