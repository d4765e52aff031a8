//! Revenue aggregation across every revenue-like concept.
//!
//! Companies report revenue under several concepts and often restate it, so
//! observations are pooled across every concept whose name contains
//! "revenue". Each distinct frame label keeps its maximum value: amended or
//! later filings are assumed never to understate revenue for the same
//! period. Q4 comes from the annual frame minus Q1-Q3 and is only derived
//! when all three quarters and the annual frame are present.
//!
//! Each kept value lands in the slot of its own label's quarter rather than
//! in the slot of its position in the sorted list. A year missing Q2 yields
//! q1 and q3, not q2 holding the Q3 value and q3 holding the annual total.

use facts_core::{DataError, FactRepository, PeriodLabel, Quarter, Result};
use tracing::debug;

use crate::QuarterValues;
use crate::window::{subtract_preceding, synthetic_label};

/// One pooled revenue figure and its lowercased frame label.
#[derive(Clone, Debug, PartialEq)]
struct Candidate {
    value: f64,
    label: String,
}

/// Revenue observations pooled from every revenue concept of a repository.
///
/// The pool is built once per derivation run and queried per target year;
/// it is never shared between runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevenuePool {
    candidates: Vec<Candidate>,
}

impl RevenuePool {
    /// Pools quarterly and annual report observations from every concept
    /// whose name contains "revenue".
    ///
    /// Observations without a frame label get one synthesized from their
    /// fiscal period and window when it maps onto a single label; others
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ConceptNotFound`] if the repository has no
    /// revenue concept at all.
    pub fn collect(repository: &FactRepository) -> Result<Self> {
        let mut concepts = 0usize;
        let mut candidates = Vec::new();

        for (concept, facts) in repository.revenue_concepts() {
            concepts += 1;
            let before = candidates.len();

            for obs in facts.periodic_reports() {
                let label = match obs.frame_label() {
                    Some(label) => label.to_ascii_lowercase(),
                    None => match synthetic_label(obs) {
                        Some(label) => label.to_string().to_ascii_lowercase(),
                        None => continue,
                    },
                };
                candidates.push(Candidate {
                    value: obs.value(),
                    label,
                });
            }

            debug!(
                concept,
                pooled = candidates.len() - before,
                "Pooled revenue observations"
            );
        }

        if concepts == 0 {
            return Err(DataError::ConceptNotFound("revenue".to_string()));
        }

        Ok(Self { candidates })
    }

    /// Returns the number of pooled observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if nothing was pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Derives the revenue quarters of `year`.
    #[must_use]
    pub fn quarters(&self, year: i32) -> QuarterValues {
        let prefix = format!("cy{year}");

        // distinct labels of the year in first-seen order, keeping the maximum
        let mut labels: Vec<(String, f64)> = Vec::new();
        for candidate in self.candidates.iter().filter(|c| c.label.contains(&prefix)) {
            match labels.iter_mut().find(|(label, _)| *label == candidate.label) {
                Some((_, best)) => *best = best.max(candidate.value),
                None => labels.push((candidate.label.clone(), candidate.value)),
            }
        }

        labels.sort_by_key(|(label, _)| period_sort_key(label));

        let kept: Vec<(PeriodLabel, f64)> = labels
            .into_iter()
            .filter_map(|(label, value)| {
                let parsed = PeriodLabel::parse(&label)?;
                let wanted = parsed.year == year
                    && (parsed.is_annual() || parsed.quarter_rank <= 3);
                wanted.then_some((parsed, value))
            })
            .collect();

        let mut quarters = QuarterValues::new();
        for (label, value) in &kept {
            if let Some(quarter) = label.as_quarter() {
                quarters.insert(quarter, *value);
            }
        }

        match kept.as_slice() {
            [_, _, _, (last, annual)] if last.is_annual() => {
                if let Some(q4) = subtract_preceding(*annual, Quarter::Q4, &quarters) {
                    quarters.insert(Quarter::Q4, q4);
                }
            }
            _ => debug!(year, labels = kept.len(), "Revenue Q4 not derivable"),
        }

        quarters
    }
}

/// Derives the revenue quarters of `year` from a repository.
///
/// Prefer [`RevenuePool::collect`] plus [`RevenuePool::quarters`] when
/// deriving several years from the same repository.
///
/// # Errors
///
/// Returns [`DataError::ConceptNotFound`] if the repository has no revenue
/// concept.
pub fn aggregate_revenue(repository: &FactRepository, year: i32) -> Result<QuarterValues> {
    Ok(RevenuePool::collect(repository)?.quarters(year))
}

/// Sort key placing recognized labels chronologically, quarters before their
/// year's annual frame, and unrecognized labels last.
fn period_sort_key(label: &str) -> (bool, Option<PeriodLabel>) {
    let parsed = PeriodLabel::parse(label);
    (parsed.is_none(), parsed)
}

/// Sorts frame labels chronologically.
///
/// Quarterly frames order before their year's annual frame; unrecognized
/// labels move to the end and keep their relative order.
pub fn sort_period_labels<S: AsRef<str>>(labels: &mut [S]) {
    labels.sort_by_key(|label| period_sort_key(label.as_ref()));
}
