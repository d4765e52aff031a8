//! Core data types for disclosed facts and derived series.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Observation`] - One disclosed fact instance
//! - [`MetricFactSet`] - Observations for one concept, in arrival order
//! - [`FactRepository`] - Concept name to fact set mapping for one company
//! - [`CompanyFacts`] - A fetched repository plus company identifiers
//! - [`Metric`] - The derived metrics
//! - [`QuarterlySeries`] - Year/quarter output of a derivation

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, PlSmallStr};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::period::{FilingForm, FiscalPeriod, PeriodLabel, Quarter};

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One disclosed fact instance.
///
/// Observations are immutable once constructed; the period window is
/// checked on construction so `period_start <= period_end` always holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    value: f64,
    form: FilingForm,
    period_start: NaiveDate,
    period_end: NaiveDate,
    fiscal_period: FiscalPeriod,
    frame_label: Option<String>,
}

impl Observation {
    /// Creates a new observation without a frame label.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidObservation`] if `period_start` is after
    /// `period_end`.
    pub fn new(
        value: f64,
        form: FilingForm,
        period_start: NaiveDate,
        period_end: NaiveDate,
        fiscal_period: FiscalPeriod,
    ) -> Result<Self> {
        if period_start > period_end {
            return Err(DataError::InvalidObservation(format!(
                "period starts {period_start} after it ends {period_end}"
            )));
        }
        Ok(Self {
            value,
            form,
            period_start,
            period_end,
            fiscal_period,
            frame_label: None,
        })
    }

    /// Sets the standardized frame label.
    #[must_use]
    pub fn with_frame_label(mut self, label: impl Into<String>) -> Self {
        self.frame_label = Some(label.into());
        self
    }

    /// Reported value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Form of the filing this fact came from.
    #[must_use]
    pub const fn form(&self) -> FilingForm {
        self.form
    }

    /// First day of the reported window.
    #[must_use]
    pub const fn period_start(&self) -> NaiveDate {
        self.period_start
    }

    /// Last day of the reported window.
    #[must_use]
    pub const fn period_end(&self) -> NaiveDate {
        self.period_end
    }

    /// Fiscal period the filing designated.
    #[must_use]
    pub const fn fiscal_period(&self) -> FiscalPeriod {
        self.fiscal_period
    }

    /// Raw standardized frame label, if the source published one.
    #[must_use]
    pub fn frame_label(&self) -> Option<&str> {
        self.frame_label.as_deref()
    }

    /// Parsed frame label; `None` when absent or not a duration frame.
    #[must_use]
    pub fn period_label(&self) -> Option<PeriodLabel> {
        self.frame_label.as_deref().and_then(PeriodLabel::parse)
    }
}

/// Observations for one concept in filing-arrival order.
///
/// Arrival order is not chronological; consumers must not assume sortedness.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetricFactSet {
    observations: Vec<Observation>,
}

impl MetricFactSet {
    /// Creates an empty fact set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observations: Vec::new(),
        }
    }

    /// Creates a fact set from observations in arrival order.
    #[must_use]
    pub const fn from_observations(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Appends an observation.
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns an iterator over the observations in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Observations from quarterly or annual reports only.
    pub fn periodic_reports(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(|o| o.form().is_periodic_report())
    }
}

impl FromIterator<Observation> for MetricFactSet {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MetricFactSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// Fact sets of one company keyed by concept name.
///
/// The repository is read-only during a derivation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FactRepository {
    concepts: HashMap<String, MetricFactSet>,
}

impl FactRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the fact set for a concept.
    pub fn insert(&mut self, concept: impl Into<String>, facts: MetricFactSet) {
        self.concepts.insert(concept.into(), facts);
    }

    /// Sets the fact set for a concept.
    #[must_use]
    pub fn with_concept(mut self, concept: impl Into<String>, facts: MetricFactSet) -> Self {
        self.insert(concept, facts);
        self
    }

    /// Looks up a concept by exact name, then ignoring ASCII case.
    ///
    /// When several names match ignoring case, the lexicographically
    /// smallest one wins.
    #[must_use]
    pub fn concept(&self, name: &str) -> Option<&MetricFactSet> {
        self.concepts.get(name).or_else(|| {
            self.concepts
                .iter()
                .filter(|(concept, _)| concept.eq_ignore_ascii_case(name))
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, facts)| facts)
        })
    }

    /// Every concept whose name contains "revenue", ignoring case.
    pub fn revenue_concepts(&self) -> impl Iterator<Item = (&str, &MetricFactSet)> {
        self.concepts
            .iter()
            .filter(|(concept, _)| concept.to_ascii_lowercase().contains("revenue"))
            .map(|(concept, facts)| (concept.as_str(), facts))
    }

    /// Returns the concept names.
    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// Returns the number of concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if there are no concepts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// A fetched fact repository with the identifiers of its company.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompanyFacts {
    /// Ticker the repository was requested for.
    pub symbol: Symbol,
    /// SEC CIK number, zero-padded to 10 digits.
    pub cik: Option<String>,
    /// Registrant name.
    pub entity_name: Option<String>,
    /// Disclosed facts keyed by concept.
    pub facts: FactRepository,
}

impl CompanyFacts {
    /// Creates company facts with no identifiers beyond the symbol.
    #[must_use]
    pub const fn new(symbol: Symbol, facts: FactRepository) -> Self {
        Self {
            symbol,
            cik: None,
            entity_name: None,
            facts,
        }
    }

    /// Sets the SEC CIK number.
    #[must_use]
    pub fn with_cik(mut self, cik: impl Into<String>) -> Self {
        self.cik = Some(cik.into());
        self
    }

    /// Sets the registrant name.
    #[must_use]
    pub fn with_entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }
}

/// A metric derived into a quarterly series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Diluted earnings per share.
    #[serde(rename = "epsd")]
    DilutedEps,
    /// Net cash provided by operating activities.
    #[serde(rename = "operating cashflow")]
    OperatingCashFlow,
    /// Total revenue pooled across revenue concepts.
    #[serde(rename = "total revenue")]
    Revenue,
}

impl Metric {
    /// Returns the metric name used in output series.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DilutedEps => "epsd",
            Self::OperatingCashFlow => "operating cashflow",
            Self::Revenue => "total revenue",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived quarter values of one metric for one company.
///
/// A quarter missing from a year means the value was not derivable; it is
/// never zero-filled. Years with no derivable quarter are not present.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuarterlySeries {
    company: Symbol,
    metric: Metric,
    years: BTreeMap<i32, BTreeMap<Quarter, f64>>,
}

impl QuarterlySeries {
    /// Creates an empty series.
    #[must_use]
    pub const fn new(company: Symbol, metric: Metric) -> Self {
        Self {
            company,
            metric,
            years: BTreeMap::new(),
        }
    }

    /// Records the derived quarters of a year. Empty maps are ignored.
    pub fn insert_year(&mut self, year: i32, quarters: BTreeMap<Quarter, f64>) {
        if !quarters.is_empty() {
            self.years.insert(year, quarters);
        }
    }

    /// Company the series belongs to.
    #[must_use]
    pub const fn company(&self) -> &Symbol {
        &self.company
    }

    /// Metric the series holds.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Year to quarter map.
    #[must_use]
    pub const fn years(&self) -> &BTreeMap<i32, BTreeMap<Quarter, f64>> {
        &self.years
    }

    /// Returns a single derived value.
    #[must_use]
    pub fn get(&self, year: i32, quarter: Quarter) -> Option<f64> {
        self.years.get(&year)?.get(&quarter).copied()
    }

    /// Returns true if no year has a derived value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Iterates `(year, quarter, value)` in chronological order.
    pub fn rows(&self) -> impl Iterator<Item = (i32, Quarter, f64)> + '_ {
        self.years
            .iter()
            .flat_map(|(year, quarters)| quarters.iter().map(|(q, v)| (*year, *q, *v)))
    }

    /// Exports the series as a long-format DataFrame.
    ///
    /// Columns: company, metric, year, quarter, value.
    pub fn to_frame(&self) -> Result<DataFrame> {
        series_frame([self])
    }
}

/// Stacks series into one long-format DataFrame.
///
/// Columns: company, metric, year, quarter, value.
pub fn series_frame<'a>(series: impl IntoIterator<Item = &'a QuarterlySeries>) -> Result<DataFrame> {
    let mut companies: Vec<&str> = Vec::new();
    let mut metrics: Vec<&str> = Vec::new();
    let mut years: Vec<i32> = Vec::new();
    let mut quarters: Vec<&str> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for s in series {
        for (year, quarter, value) in s.rows() {
            companies.push(s.company.as_str());
            metrics.push(s.metric.name());
            years.push(year);
            quarters.push(quarter.tag());
            values.push(value);
        }
    }

    DataFrame::new(vec![
        Column::new(PlSmallStr::from("company"), companies),
        Column::new(PlSmallStr::from("metric"), metrics),
        Column::new(PlSmallStr::from("year"), years),
        Column::new(PlSmallStr::from("quarter"), quarters),
        Column::new(PlSmallStr::from("value"), values),
    ])
    .map_err(|e| DataError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_symbol_creation() {
        let symbol = Symbol::new(" aapl ");
        assert_eq!(symbol.as_str(), "AAPL");
        assert_eq!(symbol.to_string(), "AAPL");
    }

    #[test]
    fn test_observation_rejects_inverted_window() {
        let result = Observation::new(
            1.0,
            FilingForm::QuarterlyReport,
            date(2023, 6, 30),
            date(2023, 1, 1),
            FiscalPeriod::Q2,
        );
        assert!(matches!(result, Err(DataError::InvalidObservation(_))));
    }

    #[test]
    fn test_observation_period_label() {
        let obs = Observation::new(
            1.5,
            FilingForm::QuarterlyReport,
            date(2023, 4, 1),
            date(2023, 6, 30),
            FiscalPeriod::Q2,
        )
        .unwrap()
        .with_frame_label("CY2023Q2");
        assert_eq!(obs.frame_label(), Some("CY2023Q2"));
        assert_eq!(
            obs.period_label(),
            Some(PeriodLabel::quarter(2023, Quarter::Q2))
        );

        let instant = obs.clone().with_frame_label("CY2023Q2I");
        assert_eq!(instant.period_label(), None);
    }

    #[test]
    fn test_repository_concept_lookup_ignores_case() {
        let repo = FactRepository::new()
            .with_concept("earningspersharediluted", MetricFactSet::new())
            .with_concept("Revenues", MetricFactSet::new())
            .with_concept("CostOfRevenue", MetricFactSet::new())
            .with_concept("NetIncomeLoss", MetricFactSet::new());

        assert!(repo.concept("EarningsPerShareDiluted").is_some());
        assert!(repo.concept("Missing").is_none());

        let mut revenue: Vec<&str> = repo.revenue_concepts().map(|(name, _)| name).collect();
        revenue.sort_unstable();
        assert_eq!(revenue, vec!["CostOfRevenue", "Revenues"]);
    }

    #[test]
    fn test_repository_case_collisions_resolve_deterministically() {
        let set = |value: f64| -> MetricFactSet {
            [Observation::new(
                value,
                FilingForm::QuarterlyReport,
                date(2023, 1, 1),
                date(2023, 3, 31),
                FiscalPeriod::Q1,
            )
            .unwrap()]
            .into_iter()
            .collect()
        };

        let repo = FactRepository::new()
            .with_concept("revenues", set(1.0))
            .with_concept("REVENUES", set(2.0))
            .with_concept("Revenues", set(3.0));

        // exact match first
        let exact = repo.concept("Revenues").unwrap();
        assert_eq!(exact.iter().next().unwrap().value(), 3.0);

        // "REVENUES" < "Revenues" < "revenues"
        let folded = repo.concept("ReVeNuEs").unwrap();
        assert_eq!(folded.iter().next().unwrap().value(), 2.0);
    }

    #[test]
    fn test_series_skips_empty_years() {
        let mut series = QuarterlySeries::new(Symbol::new("AAPL"), Metric::Revenue);
        series.insert_year(2022, BTreeMap::new());
        series.insert_year(2023, BTreeMap::from([(Quarter::Q1, 10.0)]));

        assert_eq!(series.years().len(), 1);
        assert_eq!(series.get(2023, Quarter::Q1), Some(10.0));
        assert_eq!(series.get(2023, Quarter::Q2), None);
    }

    #[test]
    fn test_series_serializes_nested_years() {
        let mut series = QuarterlySeries::new(Symbol::new("aapl"), Metric::DilutedEps);
        series.insert_year(2023, BTreeMap::from([(Quarter::Q1, 1.52), (Quarter::Q2, 1.26)]));

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["company"], "AAPL");
        assert_eq!(json["metric"], "epsd");
        assert_eq!(json["years"]["2023"]["q1"], 1.52);
        assert_eq!(json["years"]["2023"]["q2"], 1.26);
    }

    #[test]
    fn test_series_to_frame() {
        let mut series = QuarterlySeries::new(Symbol::new("AAPL"), Metric::Revenue);
        series.insert_year(2023, BTreeMap::from([(Quarter::Q2, 12.0), (Quarter::Q1, 10.0)]));
        series.insert_year(2022, BTreeMap::from([(Quarter::Q4, 9.0)]));

        let df = series.to_frame().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 5);

        let years: Vec<Option<i32>> = df.column("year").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2022), Some(2023), Some(2023)]);
    }
}
