//! Deterministic simulated provider
//!
//! Derives stable, hash-based metrics and templated expansions so that dev
//! environments and the test suite run without network access or API keys.
//! The same inputs always produce the same outputs.

use async_trait::async_trait;

use quarry_core::domain::{CompetitorListing, CompetitorListings, Intent, KeywordMetrics};

use super::{KeywordProvider, ProviderError};

const SOURCE: &str = "simulated";

/// Expansion templates applied to every seed keyword.
const TEMPLATES: [&str; 8] = [
    "best {}",
    "{} software",
    "{} tools",
    "{} pricing",
    "{} alternatives",
    "{} platform",
    "{} services",
    "how to choose {} software",
];

/// Zero-configuration simulated data source.
#[derive(Debug, Default, Clone)]
pub struct SimulatedProvider;

impl SimulatedProvider {
    pub fn new() -> Self {
        Self
    }

    fn metrics_for(keyword: &str) -> KeywordMetrics {
        let h = fnv1a(keyword);
        // CPC stays under 13.0 so out-of-range filtering is exercisable
        // with ranges like [100, 200].
        KeywordMetrics {
            keyword: keyword.to_string(),
            volume: 500 + (h % 20_000) * 5,
            cpc: 0.8 + ((h >> 8) % 1_200) as f64 / 100.0,
            competition: ((h >> 16) % 1_000) as f64 / 1_000.0,
            difficulty: ((h >> 24) % 101) as u8,
            intent: intent_for(keyword, h),
            source: SOURCE.to_string(),
        }
    }
}

#[async_trait]
impl KeywordProvider for SimulatedProvider {
    async fn expand(
        &self,
        seeds: &[String],
        _market: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let mut expanded = Vec::with_capacity(seeds.len() * (TEMPLATES.len() + 1));
        for seed in seeds {
            expanded.push(seed.clone());
            for template in TEMPLATES {
                expanded.push(template.replace("{}", seed));
            }
        }
        Ok(expanded)
    }

    async fn competitor_listings(
        &self,
        domain: &str,
        seeds: &[String],
        _market: &str,
    ) -> Result<CompetitorListings, ProviderError> {
        let mut organic = Vec::new();
        let mut paid = Vec::new();

        for seed in seeds {
            let h = fnv1a(&format!("{domain}:{seed}"));
            // The seed itself always appears organically and never in the
            // paid set, so every competitor exposes at least one
            // organic-only opportunity on the caller's own topic.
            organic.push(CompetitorListing {
                keyword: seed.clone(),
                rank: 1 + (h % 20) as u32,
                estimated_traffic: 50.0 + (h % 5_000) as f64,
            });
            organic.push(CompetitorListing {
                keyword: format!("best {seed}"),
                rank: 1 + ((h >> 8) % 50) as u32,
                estimated_traffic: 20.0 + ((h >> 8) % 2_000) as f64,
            });
            paid.push(CompetitorListing {
                keyword: format!("{seed} for enterprise"),
                rank: 1 + ((h >> 16) % 8) as u32,
                estimated_traffic: 10.0 + ((h >> 16) % 1_000) as f64,
            });
        }

        Ok(CompetitorListings {
            domain: domain.to_string(),
            organic,
            paid,
        })
    }

    async fn keyword_metrics(
        &self,
        keywords: &[String],
        _market: &str,
    ) -> Result<Vec<KeywordMetrics>, ProviderError> {
        Ok(keywords.iter().map(|k| Self::metrics_for(k)).collect())
    }
}

/// 64-bit FNV-1a over the keyword text; cheap and stable across runs.
fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Text heuristics first, hash fallback for terms with no obvious cue.
fn intent_for(keyword: &str, h: u64) -> Intent {
    let lower = keyword.to_lowercase();
    if lower.contains("buy") || lower.contains("pricing") || lower.contains("price") {
        Intent::Transactional
    } else if lower.contains("best")
        || lower.contains("software")
        || lower.contains("tool")
        || lower.contains("platform")
        || lower.contains(" vs ")
        || lower.contains("alternatives")
    {
        Intent::Commercial
    } else if lower.contains("how") || lower.contains("what") || lower.contains("guide") {
        Intent::Informational
    } else if lower.contains("login") || lower.contains("sign in") {
        Intent::Navigational
    } else {
        match (h >> 32) % 4 {
            0 => Intent::Transactional,
            1 => Intent::Commercial,
            2 => Intent::Navigational,
            _ => Intent::Informational,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expansion_is_deterministic_and_includes_seeds() {
        let provider = SimulatedProvider::new();
        let seeds = vec!["invoice automation".to_string()];
        let first = provider.expand(&seeds, "US").await.unwrap();
        let second = provider.expand(&seeds, "US").await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains(&"invoice automation".to_string()));
        assert!(first.contains(&"invoice automation pricing".to_string()));
        assert_eq!(first.len(), 9);
    }

    #[tokio::test]
    async fn test_metrics_are_deterministic_and_bounded() {
        let provider = SimulatedProvider::new();
        let keywords = vec!["invoice automation".to_string(), "ap software".to_string()];
        let metrics = provider.keyword_metrics(&keywords, "US").await.unwrap();
        assert_eq!(metrics.len(), 2);
        for m in &metrics {
            assert!(m.cpc >= 0.8 && m.cpc < 13.0);
            assert!((0.0..1.0).contains(&m.competition));
            assert!(m.difficulty <= 100);
            assert_eq!(m.source, "simulated");
        }
        let again = provider.keyword_metrics(&keywords, "US").await.unwrap();
        assert_eq!(metrics[0].volume, again[0].volume);
    }

    #[tokio::test]
    async fn test_competitor_organic_includes_seed_without_paid() {
        let provider = SimulatedProvider::new();
        let seeds = vec!["invoice automation".to_string()];
        let listings = provider
            .competitor_listings("bill.com", &seeds, "US")
            .await
            .unwrap();
        assert_eq!(listings.domain, "bill.com");
        assert!(
            listings
                .organic
                .iter()
                .any(|l| l.keyword == "invoice automation")
        );
        assert!(
            !listings
                .paid
                .iter()
                .any(|l| l.keyword == "invoice automation")
        );
    }

    #[test]
    fn test_intent_heuristics() {
        assert_eq!(intent_for("invoice pricing", 0), Intent::Transactional);
        assert_eq!(intent_for("best invoice software", 0), Intent::Commercial);
        assert_eq!(intent_for("how to send an invoice", 0), Intent::Informational);
        assert_eq!(intent_for("quickbooks login", 0), Intent::Navigational);
    }
}
