//! Run lifecycle operations

use quarry_core::domain::{PipelineJobInput, PipelineRun};
use quarry_core::dto::{RunList, RunSubmitted};
use tracing::debug;
use uuid::Uuid;

use crate::{PipelineClient, Result};

impl PipelineClient {
    /// Submit a new pipeline run
    ///
    /// The run is accepted and queued; use [`PipelineClient::get_run`] or
    /// [`PipelineClient::watch_run`](crate::PipelineClient::watch_run) to
    /// observe progress.
    pub async fn submit_run(&self, input: &PipelineJobInput) -> Result<RunSubmitted> {
        debug!(market = %input.market, seeds = input.seeds.len(), "Submitting pipeline run");

        let response = self
            .client
            .post(format!("{}/run", self.base_url))
            .json(input)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Fetch a single run by id, including its result or error once terminal
    pub async fn get_run(&self, id: Uuid) -> Result<PipelineRun> {
        let response = self
            .client
            .get(format!("{}/jobs/{}", self.base_url, id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List recent runs, newest first
    ///
    /// `product_id` narrows the listing to a single product; `limit` caps the
    /// number of runs returned (the server applies its own default and cap).
    pub async fn list_runs(
        &self,
        product_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<PipelineRun>> {
        let mut request = self.client.get(format!("{}/jobs", self.base_url));

        if let Some(product_id) = product_id {
            request = request.query(&[("productId", product_id)]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = request.send().await?;
        let list: RunList = self.handle_response(response).await?;
        Ok(list.runs)
    }

    /// Request cancellation of an active run
    ///
    /// Cancellation takes effect at the next stage boundary; poll
    /// [`PipelineClient::get_run`] to observe the terminal state.
    pub async fn cancel_run(&self, id: Uuid) -> Result<()> {
        debug!(run_id = %id, "Cancelling pipeline run");

        let response = self
            .client
            .post(format!("{}/jobs/{}/cancel", self.base_url, id))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Fetch a run, mapping a 404 to `None`
    pub async fn try_get_run(&self, id: Uuid) -> Result<Option<PipelineRun>> {
        match self.get_run(id).await {
            Ok(run) => Ok(Some(run)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ClientError;

    #[test]
    fn test_not_found_detection() {
        let err = ClientError::api_error(404, "Run not found".to_string());
        assert!(err.is_not_found());

        let err = ClientError::api_error(500, "boom".to_string());
        assert!(!err.is_not_found());
    }
}
