#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/facts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarterly financial series derived from disclosed company facts.
//!
//! This crate ties a [`FactSource`] to the derivation engine. It re-exports
//! the core types, the derivation functions, and the SEC EDGAR source, and
//! provides a [`FactsLookup`] that fetches a company's facts and derives its
//! diluted EPS, operating cash flow and revenue series in one call.
//!
//! # Features
//!
//! - `edgar` - SEC EDGAR fact source (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use facts::{DerivationWindow, FactsLookup, Quarter};
//!
//! #[tokio::main]
//! async fn main() -> facts::Result<()> {
//!     let lookup = FactsLookup::edgar()?.with_window(DerivationWindow::new(2023, 2025));
//!
//!     let report = lookup.lookup("AAPL").await?;
//!     println!("{:?}", report.eps.get(2024, Quarter::Q4));
//!     println!("{}", report.to_frame()?);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use facts_core::*;

// Derivation
pub use facts_quarterly::{
    DILUTED_EPS_CONCEPT, DerivationWindow, DerivedSeries, OPERATING_CASH_FLOW_CONCEPT,
    QuarterValues, RevenuePool, aggregate_revenue, derive_quarterly_series, resolve_quarters,
    sort_period_labels,
};

// Sources
#[cfg(feature = "edgar")]
pub use facts_edgar::{EdgarConfig, EdgarFactSource, parse_company_facts};

mod lookup;
pub use lookup::{FactsLookup, FactsReport};
