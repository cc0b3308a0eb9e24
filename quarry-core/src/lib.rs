//! Quarry Core
//!
//! Core types and pure engines for the Quarry keyword-research pipeline.
//!
//! This crate contains:
//! - Domain types: Core business entities (PipelineRun, ScoredKeyword, etc.)
//! - DTOs: Data transfer objects for the orchestrator API
//! - Scoring engine: deterministic keyword scoring and tier assignment
//! - Gap detector: competitive gap classification
//!
//! Nothing in this crate performs I/O; the orchestrator and client crates
//! own all network and persistence concerns.

pub mod domain;
pub mod dto;
pub mod gap;
pub mod scoring;
