//! Competitive gap domain types

use serde::{Deserialize, Serialize};

use crate::domain::keyword::Intent;

/// How a competitor exploits a keyword the caller does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapType {
    /// Competitor ranks organically but neither party bids on the term.
    OrganicOnly,
    /// Low paid competition on a commercial or transactional term.
    LowCompetitionHighIntent,
    /// Present only in a competitor's paid set, absent from the caller's
    /// keyword set entirely.
    Untapped,
}

/// One classified gap against one competitor.
///
/// A keyword may appear as a gap against multiple competitors; each
/// occurrence is a distinct record and is not deduplicated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordGap {
    pub keyword: String,
    pub volume: u64,
    pub cpc: f64,
    pub competition: f64,
    pub intent: Intent,
    /// The competitor domain holding this keyword.
    pub competitor: String,
    /// That competitor's rank for the keyword.
    pub rank: u32,
    pub estimated_traffic: f64,
    pub gap_type: GapType,
}
