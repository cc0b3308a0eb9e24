//! Quarry HTTP Client
//!
//! A simple, type-safe HTTP client for the Quarry orchestrator API, plus a
//! cancellable polling watch for observing runs to completion.
//!
//! # Example
//!
//! ```no_run
//! use quarry_client::PipelineClient;
//! use quarry_core::domain::{CpcRange, PipelineJobInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quarry_client::ClientError> {
//!     let client = PipelineClient::new("http://localhost:8080");
//!
//!     let submitted = client
//!         .submit_run(&PipelineJobInput {
//!             seeds: vec!["invoice automation".to_string()],
//!             market: "US".to_string(),
//!             competitors: vec!["bill.com".to_string()],
//!             cpc_range: CpcRange { min: 1.0, max: 15.0 },
//!             product_id: None,
//!             product: None,
//!         })
//!         .await?;
//!
//!     println!("Submitted run: {}", submitted.job_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod runs;
mod schedules;
mod watch;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use watch::{RunWatch, WatchOutcome};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Quarry orchestrator API
///
/// Methods are organized into logical groups:
/// - Run lifecycle (submit, get, list, cancel)
/// - Schedule management (upsert, list, delete)
/// - Run watching (cancellable polling until a terminal status)
#[derive(Debug, Clone)]
pub struct PipelineClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl PipelineClient {
    /// Create a new orchestrator client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client with a custom reqwest client, for configuring
    /// timeouts, proxies, or TLS settings.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON, surfacing the server's
    /// error envelope message on non-2xx statuses.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::api_error(
                status.as_u16(),
                read_envelope_message(response).await,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {e}")))
    }

    /// Handle an API response that returns no content (e.g., DELETE).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::api_error(
                status.as_u16(),
                read_envelope_message(response).await,
            ));
        }

        Ok(())
    }
}

/// Extracts the `error` field from the JSON error envelope, falling back
/// to the raw body text.
async fn read_envelope_message(response: reqwest::Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PipelineClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PipelineClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = PipelineClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
