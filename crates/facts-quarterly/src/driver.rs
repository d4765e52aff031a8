//! Derivation driver assembling the per-metric quarterly series.

use std::fmt::Display;
use std::ops::RangeInclusive;

use facts_core::{DataError, FactRepository, Metric, QuarterlySeries, Result, Symbol};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::QuarterValues;
use crate::resolver::resolve_quarters;
use crate::revenue::RevenuePool;

/// Concept holding diluted earnings per share.
pub const DILUTED_EPS_CONCEPT: &str = "EarningsPerShareDiluted";

/// Concept holding net cash provided by operating activities.
pub const OPERATING_CASH_FLOW_CONCEPT: &str = "NetCashProvidedByUsedInOperatingActivities";

/// Closed range of calendar years to derive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationWindow {
    /// First year derived.
    pub start_year: i32,
    /// Last year derived (inclusive).
    pub terminal_year: i32,
}

impl Default for DerivationWindow {
    fn default() -> Self {
        Self {
            start_year: 2022,
            terminal_year: 2025,
        }
    }
}

impl DerivationWindow {
    /// Creates a window covering `start_year..=terminal_year`.
    #[must_use]
    pub const fn new(start_year: i32, terminal_year: i32) -> Self {
        Self {
            start_year,
            terminal_year,
        }
    }

    /// Sets the first year.
    #[must_use]
    pub const fn with_start_year(mut self, start_year: i32) -> Self {
        self.start_year = start_year;
        self
    }

    /// Sets the last year.
    #[must_use]
    pub const fn with_terminal_year(mut self, terminal_year: i32) -> Self {
        self.terminal_year = terminal_year;
        self
    }

    /// Years in the window; empty when `start_year > terminal_year`.
    #[must_use]
    pub const fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.terminal_year
    }
}

/// The three series derived for one company.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedSeries {
    /// Diluted EPS.
    pub eps: QuarterlySeries,
    /// Operating cash flow.
    pub cashflow: QuarterlySeries,
    /// Total revenue.
    pub revenue: QuarterlySeries,
}

/// Derives the diluted EPS, operating cash flow and revenue series of a
/// company for every year of `window`.
///
/// Each metric and year is derived independently: a missing concept or an
/// underivable year leaves only that slot out of its series. Nothing here
/// fails; an empty repository yields three series without years.
#[instrument(skip(company, repository), fields(company = %company, concepts = repository.len()))]
pub fn derive_quarterly_series(
    company: &Symbol,
    repository: &FactRepository,
    window: DerivationWindow,
) -> DerivedSeries {
    let mut eps = QuarterlySeries::new(company.clone(), Metric::DilutedEps);
    let mut cashflow = QuarterlySeries::new(company.clone(), Metric::OperatingCashFlow);
    let mut revenue = QuarterlySeries::new(company.clone(), Metric::Revenue);

    let revenue_pool = RevenuePool::collect(repository);

    for year in window.years() {
        record(
            &mut eps,
            year,
            resolve_concept(repository, DILUTED_EPS_CONCEPT, year),
        );
        record(
            &mut cashflow,
            year,
            resolve_concept(repository, OPERATING_CASH_FLOW_CONCEPT, year),
        );
        record(
            &mut revenue,
            year,
            revenue_pool.as_ref().map(|pool| pool.quarters(year)),
        );
    }

    debug!(
        eps_years = eps.years().len(),
        cashflow_years = cashflow.years().len(),
        revenue_years = revenue.years().len(),
        "Derived quarterly series"
    );

    DerivedSeries {
        eps,
        cashflow,
        revenue,
    }
}

fn resolve_concept(repository: &FactRepository, concept: &str, year: i32) -> Result<QuarterValues> {
    let facts = repository
        .concept(concept)
        .ok_or_else(|| DataError::ConceptNotFound(concept.to_string()))?;
    Ok(resolve_quarters(facts, year))
}

fn record<E: Display>(
    series: &mut QuarterlySeries,
    year: i32,
    result: std::result::Result<QuarterValues, E>,
) {
    match result {
        Ok(quarters) => {
            debug!(metric = %series.metric(), year, quarters = quarters.len(), "Derived year");
            series.insert_year(year, quarters);
        }
        Err(e) => {
            debug!(metric = %series.metric(), year, error = %e, "Skipping metric for year");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{date, facts, framed_quarter, framed_year, obs};
    use facts_core::Quarter;

    fn repository() -> FactRepository {
        let mut eps = Vec::new();
        let mut revenue = Vec::new();
        let mut cash = Vec::new();
        for year in 2021..=2026 {
            for q in 1..=3 {
                eps.push(framed_quarter(1.0, year, q));
                revenue.push(framed_quarter(100.0, year, q));
            }
            eps.push(framed_year(4.5, year));
            revenue.push(framed_year(420.0, year));
            cash.push(obs(10.0, "10-Q", date(year, 1, 1), date(year, 3, 31), "Q1", None));
            cash.push(obs(25.0, "10-Q", date(year, 1, 1), date(year, 6, 30), "Q2", None));
        }

        FactRepository::new()
            .with_concept(DILUTED_EPS_CONCEPT, facts(eps))
            .with_concept("Revenues", facts(revenue))
            .with_concept(OPERATING_CASH_FLOW_CONCEPT, facts(cash))
    }

    #[test]
    fn test_window_defaults() {
        let window = DerivationWindow::default();
        assert_eq!(window.years().collect::<Vec<_>>(), vec![2022, 2023, 2024, 2025]);
        assert_eq!(DerivationWindow::new(2025, 2022).years().count(), 0);
        assert_eq!(window.with_start_year(2024).years().count(), 2);
    }

    #[test]
    fn test_year_range_is_closed() {
        let symbol = Symbol::new("TEST");
        let derived = derive_quarterly_series(&symbol, &repository(), DerivationWindow::new(2022, 2025));

        for series in [&derived.eps, &derived.cashflow, &derived.revenue] {
            let years: Vec<i32> = series.years().keys().copied().collect();
            assert_eq!(years, vec![2022, 2023, 2024, 2025]);
            assert_eq!(series.company(), &symbol);
        }

        assert_eq!(derived.eps.get(2024, Quarter::Q4), Some(1.5));
        assert_eq!(derived.revenue.get(2023, Quarter::Q4), Some(120.0));
        assert_eq!(derived.cashflow.get(2025, Quarter::Q2), Some(15.0));
        assert_eq!(derived.cashflow.get(2025, Quarter::Q3), None);
    }

    #[test]
    fn test_empty_repository_yields_empty_series() {
        let derived = derive_quarterly_series(
            &Symbol::new("NONE"),
            &FactRepository::new(),
            DerivationWindow::default(),
        );

        assert!(derived.eps.is_empty());
        assert!(derived.cashflow.is_empty());
        assert!(derived.revenue.is_empty());
        assert_eq!(derived.eps.metric(), Metric::DilutedEps);
        assert_eq!(derived.cashflow.metric(), Metric::OperatingCashFlow);
        assert_eq!(derived.revenue.metric(), Metric::Revenue);
    }

    #[test]
    fn test_missing_concept_only_affects_its_metric() {
        let repository = FactRepository::new()
            .with_concept("Revenues", facts(vec![framed_quarter(10.0, 2023, 1)]));

        let derived =
            derive_quarterly_series(&Symbol::new("REV"), &repository, DerivationWindow::default());

        assert!(derived.eps.is_empty());
        assert!(derived.cashflow.is_empty());
        assert_eq!(derived.revenue.years().len(), 1);
        assert_eq!(derived.revenue.get(2023, Quarter::Q1), Some(10.0));
    }

    #[test]
    fn test_unreported_recent_year_is_omitted() {
        let repository = FactRepository::new().with_concept(
            DILUTED_EPS_CONCEPT,
            facts(vec![framed_quarter(1.0, 2022, 1), framed_quarter(1.1, 2023, 1)]),
        );

        let derived =
            derive_quarterly_series(&Symbol::new("EPS"), &repository, DerivationWindow::default());
        let years: Vec<i32> = derived.eps.years().keys().copied().collect();
        assert_eq!(years, vec![2022, 2023]);
    }

    #[test]
    fn test_derived_series_serializes_per_metric() {
        let derived = derive_quarterly_series(
            &Symbol::new("aapl"),
            &repository(),
            DerivationWindow::new(2023, 2023),
        );

        let json = serde_json::to_value(&derived).unwrap();
        assert_eq!(json["eps"]["metric"], "epsd");
        assert_eq!(json["cashflow"]["metric"], "operating cashflow");
        assert_eq!(json["revenue"]["metric"], "total revenue");
        assert_eq!(json["revenue"]["years"]["2023"]["q1"], 100.0);
    }
}
