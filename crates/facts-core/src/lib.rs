#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/facts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for disclosed financial facts and derived quarterly series.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`Observation`](types::Observation) - One disclosed fact instance
//! - [`FactRepository`](types::FactRepository) - Concept name to observations
//! - [`PeriodLabel`](period::PeriodLabel) - Chronological key of a frame label
//! - [`QuarterlySeries`](types::QuarterlySeries) - Derived year/quarter values
//! - [`FactSource`](provider::FactSource) - Fact retrieval abstraction

/// Error types for fact retrieval and derivation.
pub mod error;
/// Filing form, fiscal period, quarter, and frame label types.
pub mod period;
/// Provider trait for fetching fact repositories.
pub mod provider;
/// Core data types (Symbol, Observation, QuarterlySeries, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DataError, Result};
pub use period::{FilingForm, FiscalPeriod, PeriodLabel, Quarter};
pub use provider::FactSource;
pub use types::{
    CompanyFacts, FactRepository, Metric, MetricFactSet, Observation, QuarterlySeries, Symbol,
    series_frame,
};
