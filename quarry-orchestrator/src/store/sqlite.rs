//! SQLite-backed run store
//!
//! Durable implementation over a sqlx pool. Ids and timestamps are stored
//! as text, config/result as JSON columns; each update rewrites the whole
//! row in one statement so readers never observe a partial record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use quarry_core::domain::{PipelineJobInput, PipelineResult, PipelineRun, RunStatus};

use super::{RunFilter, RunStore, StoreError};

#[derive(Debug, Clone)]
pub struct SqliteRunStore {
    pool: SqlitePool,
}

impl SqliteRunStore {
    /// Connects and runs migrations. `sqlite::memory:` is pinned to a
    /// single connection so the schema survives pool churn.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pipeline_runs (
                id TEXT PRIMARY KEY,
                product_id TEXT,
                status TEXT NOT NULL,
                stage_detail TEXT,
                config TEXT NOT NULL,
                result TEXT,
                error TEXT,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_runs_product ON pipeline_runs(product_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_runs_created ON pipeline_runs(created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RunStore for SqliteRunStore {
    async fn create(&self, run: PipelineRun) -> Result<(), StoreError> {
        let existing = sqlx::query("SELECT id FROM pipeline_runs WHERE id = ?1")
            .bind(run.id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StoreError::Duplicate(run.id));
        }

        let row = RunRow::try_from(&run)?;
        sqlx::query(
            r#"
            INSERT INTO pipeline_runs
                (id, product_id, status, stage_detail, config, result, error,
                 created_at, started_at, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(row.id)
        .bind(row.product_id)
        .bind(row.status)
        .bind(row.stage_detail)
        .bind(row.config)
        .bind(row.result)
        .bind(row.error)
        .bind(row.created_at)
        .bind(row.started_at)
        .bind(row.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PipelineRun>, StoreError> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT id, product_id, status, stage_detail, config, result, error,
                   created_at, started_at, completed_at
            FROM pipeline_runs
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(PipelineRun::try_from).transpose()
    }

    async fn list(&self, filter: RunFilter) -> Result<Vec<PipelineRun>, StoreError> {
        let limit = filter.limit.map_or(i64::MAX, |l| l as i64);

        let rows = match &filter.product_id {
            Some(product_id) => {
                sqlx::query_as::<_, RunRow>(
                    r#"
                    SELECT id, product_id, status, stage_detail, config, result,
                           error, created_at, started_at, completed_at
                    FROM pipeline_runs
                    WHERE product_id = ?1
                    ORDER BY created_at DESC
                    LIMIT ?2
                    "#,
                )
                .bind(product_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RunRow>(
                    r#"
                    SELECT id, product_id, status, stage_detail, config, result,
                           error, created_at, started_at, completed_at
                    FROM pipeline_runs
                    ORDER BY created_at DESC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(PipelineRun::try_from).collect()
    }

    async fn update(&self, run: PipelineRun) -> Result<(), StoreError> {
        let row = RunRow::try_from(&run)?;
        let result = sqlx::query(
            r#"
            UPDATE pipeline_runs
            SET product_id = ?2, status = ?3, stage_detail = ?4, config = ?5,
                result = ?6, error = ?7, created_at = ?8, started_at = ?9,
                completed_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(row.id)
        .bind(row.product_id)
        .bind(row.status)
        .bind(row.stage_detail)
        .bind(row.config)
        .bind(row.result)
        .bind(row.error)
        .bind(row.created_at)
        .bind(row.started_at)
        .bind(row.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(run.id));
        }
        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct RunRow {
    id: String,
    product_id: Option<String>,
    status: String,
    stage_detail: Option<String>,
    config: String,
    result: Option<String>,
    error: Option<String>,
    created_at: String,
    started_at: Option<String>,
    completed_at: Option<String>,
}

impl TryFrom<&PipelineRun> for RunRow {
    type Error = StoreError;

    fn try_from(run: &PipelineRun) -> Result<Self, StoreError> {
        Ok(Self {
            id: run.id.to_string(),
            product_id: run.product_id.clone(),
            status: status_to_string(run.status).to_string(),
            stage_detail: run.stage_detail.clone(),
            config: serde_json::to_string(&run.config)?,
            result: run
                .result
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            error: run.error.clone(),
            created_at: run.created_at.to_rfc3339(),
            started_at: run.started_at.map(|t| t.to_rfc3339()),
            completed_at: run.completed_at.map(|t| t.to_rfc3339()),
        })
    }
}

impl TryFrom<RunRow> for PipelineRun {
    type Error = StoreError;

    fn try_from(row: RunRow) -> Result<Self, StoreError> {
        let config: PipelineJobInput = serde_json::from_str(&row.config)?;
        let result: Option<PipelineResult> = row
            .result
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Self {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| StoreError::Corrupt(format!("bad run id {}: {e}", row.id)))?,
            product_id: row.product_id,
            status: string_to_status(&row.status)?,
            stage_detail: row.stage_detail,
            config,
            result,
            error: row.error,
            created_at: parse_timestamp(&row.created_at)?,
            started_at: row.started_at.as_deref().map(parse_timestamp).transpose()?,
            completed_at: row
                .completed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {s}: {e}")))
}

fn status_to_string(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Queued => "queued",
        RunStatus::Expanding => "expanding",
        RunStatus::Analyzing => "analyzing",
        RunStatus::Scoring => "scoring",
        RunStatus::Reporting => "reporting",
        RunStatus::Completed => "completed",
        RunStatus::Failed => "failed",
    }
}

fn string_to_status(s: &str) -> Result<RunStatus, StoreError> {
    match s {
        "queued" => Ok(RunStatus::Queued),
        "expanding" => Ok(RunStatus::Expanding),
        "analyzing" => Ok(RunStatus::Analyzing),
        "scoring" => Ok(RunStatus::Scoring),
        "reporting" => Ok(RunStatus::Reporting),
        "completed" => Ok(RunStatus::Completed),
        "failed" => Ok(RunStatus::Failed),
        other => Err(StoreError::Corrupt(format!("unknown status {other}"))),
    }
}
