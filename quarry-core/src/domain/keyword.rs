//! Keyword metric and scoring domain types

use serde::{Deserialize, Serialize};

/// Search intent classification for a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Transactional,
    Commercial,
    Informational,
    Navigational,
}

/// Raw per-keyword metrics returned by a data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMetrics {
    pub keyword: String,
    /// Monthly search volume.
    pub volume: u64,
    /// Average cost per click.
    pub cpc: f64,
    /// Paid competition density, 0.0 (none) to 1.0 (saturated).
    pub competition: f64,
    /// Organic ranking difficulty, 0 to 100.
    pub difficulty: u8,
    pub intent: Intent,
    /// Provenance tag identifying the provider that produced the metrics.
    pub source: String,
}

/// Investment-priority bucket assigned by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    SweetSpot,
    HighValue,
    Monitor,
    LowPriority,
}

/// The four weighted sub-scores behind a composite score, each on a
/// common 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub volume_score: f64,
    pub intent_score: f64,
    pub competition_score: f64,
    pub cpc_affordability_score: f64,
}

/// A keyword with its metrics, composite score, and assigned tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredKeyword {
    pub keyword: String,
    pub volume: u64,
    pub cpc: f64,
    pub competition: f64,
    pub difficulty: u8,
    pub intent: Intent,
    pub source: String,
    /// Composite 0-100 score, a fixed-weight combination of the breakdown.
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub tier: Tier,
}
