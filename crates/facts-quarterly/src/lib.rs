#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/facts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Quarter-by-quarter derivation of disclosed financial metrics.
//!
//! - [`resolve_quarters`] - Quarter resolution for scalar metrics (EPS, cash flow)
//! - [`RevenuePool`] / [`aggregate_revenue`] - Revenue pooled across revenue concepts
//! - [`derive_quarterly_series`] - Driver producing all three series for a year range
//!
//! Every derivation reads an immutable [`FactRepository`](facts_core::FactRepository)
//! and owns its working state, so runs never share accumulators.
//!
//! # Example
//!
//! ```
//! use facts_core::{FactRepository, Symbol};
//! use facts_quarterly::{DerivationWindow, derive_quarterly_series};
//!
//! let series = derive_quarterly_series(
//!     &Symbol::new("AAPL"),
//!     &FactRepository::new(),
//!     DerivationWindow::new(2022, 2025),
//! );
//! assert!(series.eps.is_empty());
//! ```

use std::collections::BTreeMap;

use facts_core::Quarter;

/// Derivation driver and year window.
pub mod driver;
/// Quarter resolution for EPS and cumulative cash-flow metrics.
pub mod resolver;
/// Revenue aggregation across revenue concepts.
pub mod revenue;

mod window;

#[cfg(test)]
mod testutil;

/// Derived values of one year, keyed by quarter. Absent quarters were not
/// derivable.
pub type QuarterValues = BTreeMap<Quarter, f64>;

pub use driver::{
    DILUTED_EPS_CONCEPT, DerivationWindow, DerivedSeries, OPERATING_CASH_FLOW_CONCEPT,
    derive_quarterly_series,
};
pub use resolver::resolve_quarters;
pub use revenue::{RevenuePool, aggregate_revenue, sort_period_labels};
