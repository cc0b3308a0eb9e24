//! Recurring-run scheduler
//!
//! Maintains schedule definitions keyed by a user-chosen `key` and fires
//! new pipeline runs at cron-due times, evaluated in each schedule's own
//! timezone. Firing is fire-and-forget, but a key whose most recent run is
//! still non-terminal is skipped rather than doubled up; that busy state is
//! tracked on the schedule entry itself so a tick never scans the run
//! store.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use quarry_core::domain::{PipelineRun, PipelineSchedule};

use crate::executor::RunExecutor;
use crate::store::RunStore;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression {expr:?}: {message}")]
    InvalidCron { expr: String, message: String },

    #[error("invalid timezone {0:?}")]
    InvalidTimezone(String),
}

/// One registered schedule plus its firing state.
struct ScheduleEntry {
    schedule: PipelineSchedule,
    cron: cron::Schedule,
    tz: Tz,
    next_fire: Option<DateTime<Utc>>,
    /// Most recently fired run for this key, used for skip-if-busy.
    last_run: Option<Uuid>,
}

/// In-process scheduler; owns every schedule entry for its lifetime.
pub struct Scheduler {
    entries: Mutex<HashMap<String, ScheduleEntry>>,
    store: Arc<dyn RunStore>,
    executor: Arc<RunExecutor>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn RunStore>, executor: Arc<RunExecutor>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store,
            executor,
        }
    }

    /// Registers or replaces a schedule by key (idempotent upsert).
    ///
    /// Replacing an existing key keeps its `last_run` so skip-if-busy
    /// still applies across the redefinition.
    pub async fn upsert(&self, schedule: PipelineSchedule) -> Result<PipelineSchedule, SchedulerError> {
        let cron = parse_cron(&schedule.cron)?;
        let tz = parse_timezone(&schedule.timezone)?;
        let next_fire = next_occurrence(&cron, tz, Utc::now());

        let mut entries = self.entries.lock().await;
        let last_run = entries
            .get(&schedule.key)
            .and_then(|existing| existing.last_run);

        info!(
            "Schedule {:?} registered (cron {:?}, tz {}, next fire {:?})",
            schedule.key, schedule.cron, schedule.timezone, next_fire
        );

        entries.insert(
            schedule.key.clone(),
            ScheduleEntry {
                schedule: schedule.clone(),
                cron,
                tz,
                next_fire,
                last_run,
            },
        );
        Ok(schedule)
    }

    /// Removes a schedule; future firings are cancelled, already-created
    /// runs are untouched. Returns false when the key was absent.
    pub async fn remove(&self, key: &str) -> bool {
        let removed = self.entries.lock().await.remove(key).is_some();
        if removed {
            info!("Schedule {:?} removed", key);
        }
        removed
    }

    pub async fn list(&self) -> Vec<PipelineSchedule> {
        let entries = self.entries.lock().await;
        let mut schedules: Vec<PipelineSchedule> =
            entries.values().map(|e| e.schedule.clone()).collect();
        schedules.sort_by(|a, b| a.key.cmp(&b.key));
        schedules
    }

    /// Fires every due schedule once; returns the number of runs created.
    ///
    /// A store failure while creating a run leaves `next_fire` untouched so
    /// the firing is retried on the next tick; a missed occurrence gets no
    /// makeup execution beyond that.
    pub async fn fire_due(&self, now: DateTime<Utc>) -> usize {
        let mut fired = 0;
        let mut entries = self.entries.lock().await;

        for entry in entries.values_mut() {
            let Some(next_fire) = entry.next_fire else {
                continue;
            };
            if next_fire > now {
                continue;
            }

            if self.is_busy(entry).await {
                debug!(
                    "Schedule {:?} skipped: previous run still active",
                    entry.schedule.key
                );
                entry.next_fire = next_occurrence(&entry.cron, entry.tz, now);
                continue;
            }

            let run = PipelineRun::new(entry.schedule.input.clone());
            let run_id = run.id;
            match self.store.create(run).await {
                Ok(()) => {
                    info!(
                        "Schedule {:?} fired, created run {}",
                        entry.schedule.key, run_id
                    );
                    self.executor.spawn(run_id);
                    entry.last_run = Some(run_id);
                    entry.next_fire = next_occurrence(&entry.cron, entry.tz, now);
                    fired += 1;
                }
                Err(e) => {
                    warn!(
                        "Schedule {:?} failed to create run, will retry next tick: {}",
                        entry.schedule.key, e
                    );
                }
            }
        }

        fired
    }

    async fn is_busy(&self, entry: &ScheduleEntry) -> bool {
        let Some(last_run) = entry.last_run else {
            return false;
        };
        match self.store.get(last_run).await {
            Ok(Some(run)) => !run.status.is_terminal(),
            Ok(None) => false,
            Err(e) => {
                // Can't tell; err on the side of not doubling up.
                warn!("Failed to check last run {} status: {}", last_run, e);
                true
            }
        }
    }

    /// Spawns the background tick loop driving `fire_due`.
    pub fn spawn_tick_loop(self: Arc<Self>, tick: Duration) -> tokio::task::JoinHandle<()> {
        info!("Starting scheduler tick loop (interval: {:?})", tick);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                let fired = self.fire_due(Utc::now()).await;
                if fired > 0 {
                    info!("Scheduler fired {} run(s) this tick", fired);
                }
            }
        })
    }
}

/// Parses a cron expression, accepting the common five-field form by
/// prepending a seconds field.
pub fn parse_cron(expr: &str) -> Result<cron::Schedule, SchedulerError> {
    let trimmed = expr.trim();
    let normalized = if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    };

    cron::Schedule::from_str(&normalized).map_err(|e| SchedulerError::InvalidCron {
        expr: expr.to_string(),
        message: e.to_string(),
    })
}

pub fn parse_timezone(tz: &str) -> Result<Tz, SchedulerError> {
    tz.parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(tz.to_string()))
}

/// Next occurrence after `after`, evaluated in the schedule's timezone and
/// converted back to Utc.
fn next_occurrence(
    schedule: &cron::Schedule,
    tz: Tz,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(&tz))
        .next()
        .map(|t| t.with_timezone(&Utc))
}
