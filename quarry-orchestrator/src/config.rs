//! Orchestrator configuration
//!
//! All parameters come from environment variables with defaults suitable
//! for local development: in-memory store and simulated provider.

use std::time::Duration;

/// Upstream data-provider connection settings.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
}

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to.
    pub bind_addr: String,

    /// SQLite database URL; none means the in-memory store.
    pub database_url: Option<String>,

    /// Real provider settings; none means the simulated provider.
    pub provider: Option<ProviderSettings>,

    /// How often the scheduler checks for due firings.
    pub scheduler_tick: Duration,
}

impl Config {
    /// Creates configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - DATABASE_URL (optional; e.g. sqlite://quarry.db?mode=rwc)
    /// - PROVIDER_BASE_URL + PROVIDER_API_KEY (optional, both or neither)
    /// - SCHEDULER_TICK_SECS (optional, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let provider = match (
            std::env::var("PROVIDER_BASE_URL").ok(),
            std::env::var("PROVIDER_API_KEY").ok(),
        ) {
            (Some(base_url), Some(api_key)) => Some(ProviderSettings { base_url, api_key }),
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!(
                    "PROVIDER_BASE_URL and PROVIDER_API_KEY must be set together"
                );
            }
            (None, None) => None,
        };

        let scheduler_tick = std::env::var("SCHEDULER_TICK_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        let config = Self {
            bind_addr,
            database_url,
            provider,
            scheduler_tick,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.scheduler_tick.as_secs() == 0 {
            anyhow::bail!("scheduler_tick must be greater than 0");
        }

        if let Some(provider) = &self.provider {
            if !provider.base_url.starts_with("http://")
                && !provider.base_url.starts_with("https://")
            {
                anyhow::bail!("provider base_url must start with http:// or https://");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            provider: None,
            scheduler_tick: Duration::from_secs(5),
        }
    }
}
