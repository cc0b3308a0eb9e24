//! Scoring engine
//!
//! Pure, deterministic mapping from raw keyword metrics to a composite
//! 0-100 score and an investment tier. No I/O, no randomness: the same
//! metrics and policy always produce the same score, so results are
//! reproducible across runs.

use crate::domain::input::CpcRange;
use crate::domain::keyword::{Intent, KeywordMetrics, ScoreBreakdown, ScoredKeyword, Tier};

/// Tunable scoring policy.
///
/// The defaults are the documented production constants; changing them
/// changes every score in the system, so they are kept stable. Weights
/// must sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    pub volume_weight: f64,
    pub intent_weight: f64,
    pub competition_weight: f64,
    pub cpc_weight: f64,
    /// Search volume at which the volume sub-score saturates at 100.
    pub volume_ceiling: u64,
    /// Composite score at or above which a keyword is high-value.
    pub high_score: f64,
    /// Composite score at or above which a keyword is worth monitoring.
    pub mid_score: f64,
    /// Competition at or below which a term counts as low-competition,
    /// shared with the gap detector.
    pub low_competition: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            volume_weight: 0.30,
            intent_weight: 0.25,
            competition_weight: 0.25,
            cpc_weight: 0.20,
            volume_ceiling: 100_000,
            high_score: 70.0,
            mid_score: 45.0,
            low_competition: 0.35,
        }
    }
}

/// Scores one keyword against the buyer's CPC range.
pub fn score_keyword(
    metrics: &KeywordMetrics,
    range: &CpcRange,
    policy: &ScoringPolicy,
) -> ScoredKeyword {
    let breakdown = ScoreBreakdown {
        volume_score: volume_score(metrics.volume, policy.volume_ceiling),
        intent_score: intent_score(metrics.intent),
        competition_score: competition_score(metrics.competition),
        cpc_affordability_score: cpc_affordability_score(metrics.cpc, range),
    };

    let score = policy.volume_weight * breakdown.volume_score
        + policy.intent_weight * breakdown.intent_score
        + policy.competition_weight * breakdown.competition_score
        + policy.cpc_weight * breakdown.cpc_affordability_score;

    ScoredKeyword {
        keyword: metrics.keyword.clone(),
        volume: metrics.volume,
        cpc: metrics.cpc,
        competition: metrics.competition,
        difficulty: metrics.difficulty,
        intent: metrics.intent,
        source: metrics.source.clone(),
        score,
        score_breakdown: breakdown,
        tier: assign_tier(score, metrics.competition, policy),
    }
}

/// Saturating, monotonically increasing volume sub-score.
///
/// Logarithmic so a term ten times more popular does not dominate ten
/// times harder; clamps at 100 once volume reaches the policy ceiling.
pub fn volume_score(volume: u64, ceiling: u64) -> f64 {
    let ceiling = ceiling.max(2) as f64;
    let raw = 100.0 * ((1.0 + volume as f64).ln() / (1.0 + ceiling).ln());
    raw.clamp(0.0, 100.0)
}

/// Fixed ranking of intents by commercial value.
pub fn intent_score(intent: Intent) -> f64 {
    match intent {
        Intent::Transactional => 100.0,
        Intent::Commercial => 80.0,
        Intent::Navigational => 40.0,
        Intent::Informational => 20.0,
    }
}

/// Monotonically decreasing in the competition metric: the system favors
/// winnable terms.
pub fn competition_score(competition: f64) -> f64 {
    (100.0 * (1.0 - competition)).clamp(0.0, 100.0)
}

/// Peaks at 100 inside the configured range; outside it, decays linearly
/// with distance measured in range-widths, flooring at 0. Rewards terms
/// priced near the buyer's budget rather than merely cheap ones.
pub fn cpc_affordability_score(cpc: f64, range: &CpcRange) -> f64 {
    if range.contains(cpc) {
        return 100.0;
    }
    let distance = if cpc < range.min {
        range.min - cpc
    } else {
        cpc - range.max
    };
    (100.0 * (1.0 - distance / range.width())).clamp(0.0, 100.0)
}

/// Total, non-overlapping tier assignment over the full (score,
/// competition) domain. The if/else chain guarantees every keyword gets
/// exactly one tier.
pub fn assign_tier(score: f64, competition: f64, policy: &ScoringPolicy) -> Tier {
    if score >= policy.high_score && competition <= policy.low_competition {
        Tier::SweetSpot
    } else if score >= policy.high_score {
        Tier::HighValue
    } else if score >= policy.mid_score {
        Tier::Monitor
    } else {
        Tier::LowPriority
    }
}
