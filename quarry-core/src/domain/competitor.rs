//! Competitor listing domain types

use serde::{Deserialize, Serialize};

/// One keyword a competitor ranks for, organically or via paid placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorListing {
    pub keyword: String,
    /// Position the competitor holds for this keyword.
    pub rank: u32,
    /// Estimated monthly traffic value of the placement.
    pub estimated_traffic: f64,
}

/// Organic and paid listings fetched for one competitor domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorListings {
    pub domain: String,
    pub organic: Vec<CompetitorListing>,
    pub paid: Vec<CompetitorListing>,
}
