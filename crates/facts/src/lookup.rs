//! Fetch-then-derive lookup over a fact source.

use std::sync::Arc;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, instrument};

use facts_core::{DataError, FactSource, QuarterlySeries, Result, Symbol, series_frame};
use facts_quarterly::{DerivationWindow, DerivedSeries, derive_quarterly_series};

/// Derived quarterly series of one company.
///
/// Serializes with the keys `eps`, `cashflow` and `revenue`, plus the
/// company identifiers reported by the source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FactsReport {
    /// Company the report belongs to.
    pub symbol: Symbol,
    /// Zero-padded CIK, when the source knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    /// Registered entity name, when the source knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Diluted EPS.
    pub eps: QuarterlySeries,
    /// Operating cash flow.
    pub cashflow: QuarterlySeries,
    /// Total revenue.
    pub revenue: QuarterlySeries,
}

impl FactsReport {
    /// Builds a report from derived series without company identifiers.
    #[must_use]
    pub fn from_series(symbol: Symbol, series: DerivedSeries) -> Self {
        Self {
            symbol,
            cik: None,
            entity_name: None,
            eps: series.eps,
            cashflow: series.cashflow,
            revenue: series.revenue,
        }
    }

    /// The three series in eps, cashflow, revenue order.
    #[must_use]
    pub const fn series(&self) -> [&QuarterlySeries; 3] {
        [&self.eps, &self.cashflow, &self.revenue]
    }

    /// Returns true if no metric has a derived value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series().iter().all(|s| s.is_empty())
    }

    /// Stacks all three series into one long-format DataFrame.
    ///
    /// Columns: company, metric, year, quarter, value.
    pub fn to_frame(&self) -> Result<DataFrame> {
        series_frame(self.series())
    }
}

/// Fetches a company's facts and derives its quarterly series.
///
/// # Example
///
/// ```rust,ignore
/// use facts::{DerivationWindow, FactsLookup};
///
/// let lookup = FactsLookup::edgar()?.with_window(DerivationWindow::new(2023, 2025));
/// let report = lookup.lookup("AAPL").await?;
/// println!("{}", serde_json::to_string_pretty(&report)?);
/// ```
#[derive(Clone)]
pub struct FactsLookup {
    source: Arc<dyn FactSource>,
    window: DerivationWindow,
}

impl std::fmt::Debug for FactsLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactsLookup")
            .field("source", &self.source.name())
            .field("window", &self.window)
            .finish()
    }
}

impl FactsLookup {
    /// Creates a lookup over `source` with the default derivation window.
    #[must_use]
    pub fn new(source: Arc<dyn FactSource>) -> Self {
        debug!(source = source.name(), "Creating facts lookup");
        Self {
            source,
            window: DerivationWindow::default(),
        }
    }

    /// Creates a lookup over SEC EDGAR configured from the environment.
    #[cfg(feature = "edgar")]
    pub fn edgar() -> Result<Self> {
        use facts_edgar::{EdgarConfig, EdgarFactSource};

        let source = EdgarFactSource::from_config(EdgarConfig::from_env())?;
        Ok(Self::new(Arc::new(source)))
    }

    /// Sets the years to derive.
    #[must_use]
    pub const fn with_window(mut self, window: DerivationWindow) -> Self {
        self.window = window;
        self
    }

    /// The configured derivation window.
    #[must_use]
    pub const fn window(&self) -> DerivationWindow {
        self.window
    }

    /// Fetches the facts of `symbol` and derives its series.
    ///
    /// Errors come only from the fetch (unknown ticker, transport, parse).
    /// Missing concepts or underivable quarters leave gaps in the report.
    #[instrument(skip(self, symbol), fields(source = self.source.name()))]
    pub async fn lookup(&self, symbol: impl Into<Symbol>) -> Result<FactsReport> {
        let symbol = symbol.into();
        if symbol.as_str().is_empty() {
            return Err(DataError::InvalidParameter("Empty symbol".to_string()));
        }

        let facts = self.source.company_facts(&symbol).await?;
        debug!(symbol = %symbol, concepts = facts.facts.len(), "Fetched company facts");

        let window = self.window;
        let company = facts.symbol.clone();
        let repository = facts.facts;
        let series = tokio::task::spawn_blocking(move || {
            derive_quarterly_series(&company, &repository, window)
        })
        .await
        .map_err(|e| DataError::Other(format!("Derivation task failed: {}", e)))?;

        Ok(FactsReport {
            cik: facts.cik,
            entity_name: facts.entity_name,
            ..FactsReport::from_series(facts.symbol, series)
        })
    }
}
