//! Schedule management operations

use quarry_core::domain::PipelineSchedule;
use quarry_core::dto::{CreateSchedule, ScheduleAck, ScheduleList};
use tracing::debug;

use crate::{PipelineClient, Result};

impl PipelineClient {
    /// Create or replace a recurring schedule
    pub async fn upsert_schedule(&self, schedule: &CreateSchedule) -> Result<ScheduleAck> {
        debug!(key = %schedule.key, cron = %schedule.cron, "Upserting schedule");

        let response = self
            .client
            .post(format!("{}/schedules", self.base_url))
            .json(schedule)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all registered schedules, sorted by key
    pub async fn list_schedules(&self) -> Result<Vec<PipelineSchedule>> {
        let response = self
            .client
            .get(format!("{}/schedules", self.base_url))
            .send()
            .await?;

        let list: ScheduleList = self.handle_response(response).await?;
        Ok(list.schedules)
    }

    /// Delete a schedule by key
    ///
    /// Deleting an unknown key succeeds; removal is idempotent.
    pub async fn delete_schedule(&self, key: &str) -> Result<()> {
        debug!(key = %key, "Deleting schedule");

        let response = self
            .client
            .delete(format!("{}/schedules/{}", self.base_url, key))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
