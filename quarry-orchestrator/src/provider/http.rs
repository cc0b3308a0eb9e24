//! HTTP-backed keyword data provider
//!
//! Talks JSON to a configured upstream keyword-data API. Response shapes
//! mirror the core domain types; failures are mapped onto the
//! [`ProviderError`] taxonomy so the executor can decide what to retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use quarry_core::domain::{CompetitorListings, KeywordMetrics};

use super::{KeywordProvider, ProviderError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Keyword data source backed by a remote HTTP API.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Upstream(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| ProviderError::Upstream(format!("malformed response body: {e}"))),
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ProviderError::Auth(read_error_text(response).await))
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ProviderError::UnsupportedMarket(read_error_text(response).await))
            }
            status => Err(ProviderError::Upstream(format!(
                "status {}: {}",
                status.as_u16(),
                read_error_text(response).await
            ))),
        }
    }
}

async fn read_error_text(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string())
}

#[derive(Serialize)]
struct ExpandRequest<'a> {
    seeds: &'a [String],
    market: &'a str,
}

#[derive(Deserialize)]
struct ExpandResponse {
    keywords: Vec<String>,
}

#[derive(Serialize)]
struct ListingsRequest<'a> {
    domain: &'a str,
    seeds: &'a [String],
    market: &'a str,
}

#[derive(Serialize)]
struct MetricsRequest<'a> {
    keywords: &'a [String],
    market: &'a str,
}

#[derive(Deserialize)]
struct MetricsResponse {
    metrics: Vec<KeywordMetrics>,
}

#[async_trait]
impl KeywordProvider for HttpProvider {
    async fn expand(
        &self,
        seeds: &[String],
        market: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let response: ExpandResponse = self
            .post_json("/v1/keywords/expand", &ExpandRequest { seeds, market })
            .await?;
        Ok(response.keywords)
    }

    async fn competitor_listings(
        &self,
        domain: &str,
        seeds: &[String],
        market: &str,
    ) -> Result<CompetitorListings, ProviderError> {
        self.post_json(
            "/v1/competitors/listings",
            &ListingsRequest {
                domain,
                seeds,
                market,
            },
        )
        .await
    }

    async fn keyword_metrics(
        &self,
        keywords: &[String],
        market: &str,
    ) -> Result<Vec<KeywordMetrics>, ProviderError> {
        let response: MetricsResponse = self
            .post_json("/v1/keywords/metrics", &MetricsRequest { keywords, market })
            .await?;
        Ok(response.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = HttpProvider::new("https://api.example.com/", "key");
        assert_eq!(provider.base_url, "https://api.example.com");
    }
}
