//! In-memory run store
//!
//! Default store for dev and tests. A `tokio::sync::RwLock` serializes
//! writes while allowing concurrent polling reads.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quarry_core::domain::PipelineRun;

use super::{RunFilter, RunStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: RwLock<HashMap<Uuid, PipelineRun>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn create(&self, run: PipelineRun) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&run.id) {
            return Err(StoreError::Duplicate(run.id));
        }
        runs.insert(run.id, run);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PipelineRun>, StoreError> {
        Ok(self.runs.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<PipelineRun>, StoreError> {
        let runs = self.runs.read().await;
        let mut selected: Vec<PipelineRun> = runs
            .values()
            .filter(|run| match &filter.product_id {
                Some(product_id) => run.product_id.as_deref() == Some(product_id.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }

    async fn update(&self, run: PipelineRun) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        if !runs.contains_key(&run.id) {
            return Err(StoreError::Missing(run.id));
        }
        runs.insert(run.id, run);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use quarry_core::domain::{CpcRange, PipelineJobInput, RunStatus};

    fn run(product_id: Option<&str>, age_secs: i64) -> PipelineRun {
        let mut run = PipelineRun::new(PipelineJobInput {
            seeds: vec!["crm".to_string()],
            market: "US".to_string(),
            competitors: vec![],
            cpc_range: CpcRange { min: 1.0, max: 10.0 },
            product_id: product_id.map(String::from),
            product: None,
        });
        run.created_at = Utc::now() - Duration::seconds(age_secs);
        run
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryRunStore::new();
        let run = run(None, 0);
        let id = run.id;
        store.create(run).await.unwrap();
        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = MemoryRunStore::new();
        let run = run(None, 0);
        store.create(run.clone()).await.unwrap();
        assert!(matches!(
            store.create(run).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_run_rejected() {
        let store = MemoryRunStore::new();
        assert!(matches!(
            store.update(run(None, 0)).await,
            Err(StoreError::Missing(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_filter_and_limit() {
        let store = MemoryRunStore::new();
        let oldest = run(Some("p1"), 30);
        let middle = run(Some("p1"), 20);
        let newest = run(Some("p1"), 10);
        let other = run(Some("p2"), 0);
        for r in [&oldest, &middle, &newest, &other] {
            store.create(r.clone()).await.unwrap();
        }

        let listed = store
            .list(RunFilter {
                product_id: Some("p1".to_string()),
                limit: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[1].id, middle.id);

        let none = store
            .list(RunFilter {
                product_id: None,
                limit: Some(0),
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        let all = store.list(RunFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, other.id);
    }
}
