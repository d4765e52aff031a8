//! Quarter resolution for scalar metrics (diluted EPS, operating cash flow).
//!
//! Each quarter of a target year is resolved in order Q1 through Q4 by an
//! ordered list of strategies:
//!
//! 1. **Frame**: an observation whose frame label is `CY{year}Q{n}` gives
//!    quarter n directly; the annual frame `CY{year}` gives Q4 as the annual
//!    total minus Q1-Q3.
//! 2. **Fiscal period**: the filing's fiscal period and window months decide
//!    whether the value is stand-alone or year-to-date; year-to-date values
//!    have the already-resolved prior quarters subtracted.
//!
//! The first strategy with a matching observation decides the quarter. A
//! quarter whose subtraction needs an unresolved prior quarter stays absent.

use facts_core::{MetricFactSet, PeriodLabel, Quarter};
use tracing::debug;

use crate::QuarterValues;
use crate::window::{classify, subtract_preceding};

/// Outcome of one resolution strategy for one quarter.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Attempt {
    /// The strategy produced the quarter's value.
    Resolved(f64),
    /// An observation matched but a prior quarter needed for subtraction
    /// is unresolved.
    Blocked,
    /// No observation matched this strategy.
    NoMatch,
}

type Strategy = fn(&MetricFactSet, i32, Quarter, &QuarterValues) -> Attempt;

/// Resolution strategies in precedence order.
const STRATEGIES: [Strategy; 2] = [from_frame, from_fiscal_period];

/// Resolves the quarter values of `year` from a metric's observations.
///
/// Only quarterly and annual report observations are considered. The
/// result is partial: quarters that cannot be derived are absent.
#[must_use]
pub fn resolve_quarters(facts: &MetricFactSet, year: i32) -> QuarterValues {
    let mut resolved = QuarterValues::new();

    for quarter in Quarter::ALL {
        let attempt = STRATEGIES
            .iter()
            .map(|strategy| strategy(facts, year, quarter, &resolved))
            .find(|attempt| *attempt != Attempt::NoMatch)
            .unwrap_or(Attempt::NoMatch);

        match attempt {
            Attempt::Resolved(value) => {
                resolved.insert(quarter, value);
            }
            Attempt::Blocked => {
                debug!(year, quarter = %quarter, "Prior quarter unresolved, leaving quarter empty");
            }
            Attempt::NoMatch => {}
        }
    }

    resolved
}

/// Frame strategy: `CY{year}Q1`..`CY{year}Q3` directly, `CY{year}` minus
/// Q1-Q3 for Q4. The last matching observation in arrival order wins.
fn from_frame(
    facts: &MetricFactSet,
    year: i32,
    quarter: Quarter,
    resolved: &QuarterValues,
) -> Attempt {
    let target = match quarter {
        Quarter::Q4 => PeriodLabel::annual(year),
        q => PeriodLabel::quarter(year, q),
    };

    let Some(obs) = facts
        .periodic_reports()
        .filter(|o| o.period_label() == Some(target))
        .last()
    else {
        return Attempt::NoMatch;
    };

    if target.is_annual() {
        subtract_preceding(obs.value(), Quarter::Q4, resolved)
            .map_or(Attempt::Blocked, Attempt::Resolved)
    } else {
        Attempt::Resolved(obs.value())
    }
}

/// Fiscal-period strategy over the reporting window of each observation.
/// The last observation in arrival order that yields a value wins.
fn from_fiscal_period(
    facts: &MetricFactSet,
    year: i32,
    quarter: Quarter,
    resolved: &QuarterValues,
) -> Attempt {
    let mut attempt = Attempt::NoMatch;

    for obs in facts.periodic_reports() {
        let Some(window) = classify(obs, year).filter(|w| w.quarter() == quarter) else {
            continue;
        };
        match window.isolate(obs.value(), resolved) {
            Some(value) => attempt = Attempt::Resolved(value),
            None if attempt == Attempt::NoMatch => attempt = Attempt::Blocked,
            None => {}
        }
    }

    attempt
}
