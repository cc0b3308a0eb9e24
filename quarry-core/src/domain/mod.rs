//! Core domain types
//!
//! This module contains the core domain structures used across Quarry
//! services. These types represent the fundamental business entities and are
//! shared between the orchestrator (persists) and the client (observes).
//!
//! All structures serialize with camelCase field names and kebab-case enum
//! values; these spellings are the wire contract and must stay stable.

pub mod competitor;
pub mod gap;
pub mod input;
pub mod keyword;
pub mod result;
pub mod run;
pub mod schedule;

pub use competitor::{CompetitorListing, CompetitorListings};
pub use gap::{GapType, KeywordGap};
pub use input::{CpcRange, PipelineJobInput, ProductSummary};
pub use keyword::{Intent, KeywordMetrics, ScoreBreakdown, ScoredKeyword, Tier};
pub use result::{PipelineResult, ResultMetadata, ResultSummary, TierCounts};
pub use run::{PipelineRun, RunStatus};
pub use schedule::PipelineSchedule;
