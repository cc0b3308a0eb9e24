//! Pipeline input types and validation

use serde::{Deserialize, Serialize};

/// Inclusive CPC range the buyer is willing to pay, in account currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpcRange {
    pub min: f64,
    pub max: f64,
}

impl CpcRange {
    /// True when `cpc` falls inside the inclusive range.
    pub fn contains(&self, cpc: f64) -> bool {
        cpc >= self.min && cpc <= self.max
    }

    /// Range width with a fallback for degenerate zero-width ranges, used
    /// by the affordability decay so division stays well-defined.
    pub fn width(&self) -> f64 {
        let w = self.max - self.min;
        if w > 0.0 { w } else { 1.0 }
    }
}

/// Optional product context used to bias scoring and downstream ad copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    pub description: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// Immutable configuration for one pipeline run.
///
/// Validated once at submission; a run's `config` field is a frozen
/// snapshot of this structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJobInput {
    /// Seed keywords to expand, in submission order. Must be non-empty.
    pub seeds: Vec<String>,
    /// Target market code, e.g. "US".
    pub market: String,
    /// Competitor domains to analyze for gaps.
    #[serde(default)]
    pub competitors: Vec<String>,
    pub cpc_range: CpcRange,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product: Option<ProductSummary>,
}

impl PipelineJobInput {
    /// Validates the input, returning the first violated rule as a
    /// human-readable message suitable for a 4xx response body.
    pub fn validate(&self) -> Result<(), String> {
        if self.seeds.is_empty() {
            return Err("at least one seed keyword is required".to_string());
        }
        if self.seeds.iter().any(|s| s.trim().is_empty()) {
            return Err("seed keywords must not be blank".to_string());
        }
        if self.market.trim().is_empty() {
            return Err("target market code is required".to_string());
        }
        if !self.cpc_range.min.is_finite() || !self.cpc_range.max.is_finite() {
            return Err("CPC range bounds must be finite numbers".to_string());
        }
        if self.cpc_range.min < 0.0 || self.cpc_range.max < 0.0 {
            return Err("CPC range bounds must be non-negative".to_string());
        }
        if self.cpc_range.min > self.cpc_range.max {
            return Err(format!(
                "CPC range is inverted: min {:.2} exceeds max {:.2}",
                self.cpc_range.min, self.cpc_range.max
            ));
        }
        Ok(())
    }
}
