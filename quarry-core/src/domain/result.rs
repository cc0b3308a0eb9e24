//! Pipeline result assembly

use serde::{Deserialize, Serialize};

use crate::domain::gap::KeywordGap;
use crate::domain::input::PipelineJobInput;
use crate::domain::keyword::{ScoredKeyword, Tier};

/// Per-tier keyword counts for the result summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub sweet_spot: usize,
    pub high_value: usize,
    pub monitor: usize,
    pub low_priority: usize,
}

/// Headline numbers derived from the scored keyword set and gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub tier_counts: TierCounts,
    pub average_cpc: f64,
    /// Highest-scoring keyword, if the set is non-empty.
    pub top_keyword: Option<String>,
    pub gap_count: usize,
    /// Coarse opportunity label: "strong", "moderate", or "limited".
    pub opportunity: String,
}

/// Provenance of a result: what was asked, when, and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub market: String,
    pub seeds: Vec<String>,
    pub competitors: Vec<String>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
}

/// Final output of a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Scored keywords, ordered by composite score descending.
    pub keywords: Vec<ScoredKeyword>,
    pub gaps: Vec<KeywordGap>,
    pub summary: ResultSummary,
    pub metadata: ResultMetadata,
}

impl PipelineResult {
    /// Assembles the final result from scored keywords and detected gaps.
    ///
    /// `keywords` must already be sorted score-descending; the summary's
    /// `top_keyword` is taken from the head of the list.
    pub fn assemble(
        keywords: Vec<ScoredKeyword>,
        gaps: Vec<KeywordGap>,
        config: &PipelineJobInput,
        generated_at: chrono::DateTime<chrono::Utc>,
        duration_ms: u64,
    ) -> Self {
        let mut tier_counts = TierCounts::default();
        for kw in &keywords {
            match kw.tier {
                Tier::SweetSpot => tier_counts.sweet_spot += 1,
                Tier::HighValue => tier_counts.high_value += 1,
                Tier::Monitor => tier_counts.monitor += 1,
                Tier::LowPriority => tier_counts.low_priority += 1,
            }
        }

        let average_cpc = if keywords.is_empty() {
            0.0
        } else {
            keywords.iter().map(|k| k.cpc).sum::<f64>() / keywords.len() as f64
        };

        let summary = ResultSummary {
            tier_counts,
            average_cpc,
            top_keyword: keywords.first().map(|k| k.keyword.clone()),
            gap_count: gaps.len(),
            opportunity: opportunity_label(tier_counts).to_string(),
        };

        let metadata = ResultMetadata {
            market: config.market.clone(),
            seeds: config.seeds.clone(),
            competitors: config.competitors.clone(),
            generated_at,
            duration_ms,
        };

        Self {
            keywords,
            gaps,
            summary,
            metadata,
        }
    }
}

/// Coarse opportunity label derived from the tier distribution.
///
/// Thresholds are policy constants: five sweet-spot terms (or ten combined
/// sweet-spot/high-value) reads as a strong market, any premium term at all
/// as moderate, otherwise limited.
fn opportunity_label(counts: TierCounts) -> &'static str {
    let premium = counts.sweet_spot + counts.high_value;
    if counts.sweet_spot >= 5 || premium >= 10 {
        "strong"
    } else if premium >= 1 {
        "moderate"
    } else {
        "limited"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::CpcRange;
    use crate::domain::keyword::{Intent, ScoreBreakdown};

    fn keyword(name: &str, score: f64, cpc: f64, tier: Tier) -> ScoredKeyword {
        ScoredKeyword {
            keyword: name.to_string(),
            volume: 1000,
            cpc,
            competition: 0.3,
            difficulty: 40,
            intent: Intent::Commercial,
            source: "test".to_string(),
            score,
            score_breakdown: ScoreBreakdown {
                volume_score: score,
                intent_score: score,
                competition_score: score,
                cpc_affordability_score: score,
            },
            tier,
        }
    }

    fn config() -> PipelineJobInput {
        PipelineJobInput {
            seeds: vec!["a".to_string()],
            market: "US".to_string(),
            competitors: vec![],
            cpc_range: CpcRange { min: 1.0, max: 10.0 },
            product_id: None,
            product: None,
        }
    }

    #[test]
    fn test_assemble_counts_and_averages() {
        let keywords = vec![
            keyword("top", 90.0, 4.0, Tier::SweetSpot),
            keyword("mid", 60.0, 6.0, Tier::Monitor),
        ];
        let result =
            PipelineResult::assemble(keywords, vec![], &config(), chrono::Utc::now(), 1200);
        assert_eq!(result.summary.tier_counts.sweet_spot, 1);
        assert_eq!(result.summary.tier_counts.monitor, 1);
        assert_eq!(result.summary.top_keyword.as_deref(), Some("top"));
        assert!((result.summary.average_cpc - 5.0).abs() < 1e-9);
        assert_eq!(result.summary.gap_count, 0);
        assert_eq!(result.metadata.duration_ms, 1200);
    }

    #[test]
    fn test_empty_keyword_set_has_no_top_keyword() {
        let result = PipelineResult::assemble(vec![], vec![], &config(), chrono::Utc::now(), 0);
        assert!(result.summary.top_keyword.is_none());
        assert_eq!(result.summary.average_cpc, 0.0);
        assert_eq!(result.summary.opportunity, "limited");
    }

    #[test]
    fn test_opportunity_labels() {
        let limited = TierCounts::default();
        assert_eq!(opportunity_label(limited), "limited");

        let moderate = TierCounts {
            high_value: 1,
            ..TierCounts::default()
        };
        assert_eq!(opportunity_label(moderate), "moderate");

        let strong = TierCounts {
            sweet_spot: 5,
            ..TierCounts::default()
        };
        assert_eq!(opportunity_label(strong), "strong");
    }
}
