//! Provider gateway
//!
//! Uniform interface to external keyword/competitor data sources. The
//! executor is written against the [`KeywordProvider`] trait; concrete
//! implementations cover the real HTTP upstream and a deterministic
//! simulation used in dev and tests.

pub mod http;
pub mod simulated;

pub use http::HttpProvider;
pub use simulated::SimulatedProvider;

use async_trait::async_trait;
use thiserror::Error;

use quarry_core::domain::{CompetitorListings, KeywordMetrics};

/// Typed failure from a data provider.
///
/// Transient failures (timeouts, rate limits) are retried by the stage
/// executor; everything else terminates the owning run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("provider authentication failed: {0}")]
    Auth(String),

    #[error("market not supported by provider: {0}")]
    UnsupportedMarket(String),

    #[error("provider request failed: {0}")]
    Upstream(String),
}

impl ProviderError {
    /// True for failures worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Timeout | ProviderError::RateLimited)
    }
}

/// External keyword/competitor data source.
///
/// All methods are network-bound; timeouts and retries are applied by the
/// caller, not the implementation.
#[async_trait]
pub trait KeywordProvider: Send + Sync {
    /// Expands seed keywords into a candidate universe of related and
    /// auto-suggest terms for the given market.
    async fn expand(&self, seeds: &[String], market: &str)
    -> Result<Vec<String>, ProviderError>;

    /// Fetches a competitor's organic and paid listings, scoped to the
    /// seed topic space.
    async fn competitor_listings(
        &self,
        domain: &str,
        seeds: &[String],
        market: &str,
    ) -> Result<CompetitorListings, ProviderError>;

    /// Fetches per-keyword metrics for the given keywords.
    async fn keyword_metrics(
        &self,
        keywords: &[String],
        market: &str,
    ) -> Result<Vec<KeywordMetrics>, ProviderError>;
}
