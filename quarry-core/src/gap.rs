//! Gap detector
//!
//! Pure comparison of the caller's scored keyword set against per-competitor
//! organic and paid listings. For each (keyword, competitor) pair at most
//! one gap type is assigned; the rule chain below is evaluated in order, so
//! classification is total and mutually exclusive wherever a gap condition
//! holds at all.
//!
//! The job input carries no live-campaign keyword list, so the caller is
//! treated as bidding on nothing: any term a competitor ranks for
//! organically without backing it with paid placement is an organic-only
//! opportunity.

use std::collections::HashMap;

use crate::domain::competitor::CompetitorListings;
use crate::domain::gap::{GapType, KeywordGap};
use crate::domain::keyword::{Intent, KeywordMetrics, ScoredKeyword};
use crate::scoring::ScoringPolicy;

/// Detects gaps for every keyword any competitor ranks for.
///
/// `metrics` covers the analyzed keyword universe; competitor terms missing
/// from it are still classifiable as organic-only or untapped, but the
/// low-competition rule cannot fire for them and their metric fields are
/// reported as zero.
pub fn detect_gaps(
    own: &[ScoredKeyword],
    listings: &[CompetitorListings],
    metrics: &HashMap<String, KeywordMetrics>,
    policy: &ScoringPolicy,
) -> Vec<KeywordGap> {
    let own_set: std::collections::HashSet<&str> =
        own.iter().map(|k| k.keyword.as_str()).collect();

    let mut gaps = Vec::new();

    for competitor in listings {
        // Collapse organic + paid entries into one record per keyword,
        // preferring the organic placement for rank/traffic.
        let mut seen: Vec<&str> = Vec::new();
        let mut organic: HashMap<&str, &crate::domain::competitor::CompetitorListing> =
            HashMap::new();
        let mut paid: HashMap<&str, &crate::domain::competitor::CompetitorListing> =
            HashMap::new();
        for entry in &competitor.organic {
            if organic.insert(entry.keyword.as_str(), entry).is_none() {
                seen.push(entry.keyword.as_str());
            }
        }
        for entry in &competitor.paid {
            if paid.insert(entry.keyword.as_str(), entry).is_none()
                && !organic.contains_key(entry.keyword.as_str())
            {
                seen.push(entry.keyword.as_str());
            }
        }

        for keyword in seen {
            let in_organic = organic.contains_key(keyword);
            let in_paid = paid.contains_key(keyword);
            let keyword_metrics = metrics.get(keyword);

            let gap_type = classify(
                keyword,
                in_organic,
                in_paid,
                own_set.contains(keyword),
                keyword_metrics,
                policy,
            );

            let Some(gap_type) = gap_type else { continue };

            let listing = organic
                .get(keyword)
                .or_else(|| paid.get(keyword))
                .copied();
            let (rank, estimated_traffic) = listing
                .map(|l| (l.rank, l.estimated_traffic))
                .unwrap_or((0, 0.0));

            gaps.push(KeywordGap {
                keyword: keyword.to_string(),
                volume: keyword_metrics.map(|m| m.volume).unwrap_or(0),
                cpc: keyword_metrics.map(|m| m.cpc).unwrap_or(0.0),
                competition: keyword_metrics.map(|m| m.competition).unwrap_or(0.0),
                intent: keyword_metrics
                    .map(|m| m.intent)
                    .unwrap_or(Intent::Informational),
                competitor: competitor.domain.clone(),
                rank,
                estimated_traffic,
                gap_type,
            });
        }
    }

    gaps
}

/// Rule chain, first match wins.
fn classify(
    _keyword: &str,
    in_organic: bool,
    in_paid: bool,
    in_own_set: bool,
    metrics: Option<&KeywordMetrics>,
    policy: &ScoringPolicy,
) -> Option<GapType> {
    if in_organic && !in_paid {
        return Some(GapType::OrganicOnly);
    }
    if let Some(m) = metrics {
        if m.competition <= policy.low_competition
            && matches!(m.intent, Intent::Transactional | Intent::Commercial)
        {
            return Some(GapType::LowCompetitionHighIntent);
        }
    }
    if in_paid && !in_own_set {
        return Some(GapType::Untapped);
    }
    None
}
