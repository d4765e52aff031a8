//! Fiscal-period classification of an observation's reporting window.

use chrono::{Datelike, NaiveDate};
use facts_core::{FiscalPeriod, Observation, PeriodLabel, Quarter};

use crate::QuarterValues;

/// What an observation's value covers within a target year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReportingWindow {
    /// The value covers exactly this quarter.
    Standalone(Quarter),
    /// The value is cumulative from the start of the year through this quarter.
    YearToDate(Quarter),
}

impl ReportingWindow {
    pub(crate) const fn quarter(&self) -> Quarter {
        match self {
            Self::Standalone(q) | Self::YearToDate(q) => *q,
        }
    }

    /// Isolates the single-quarter value, subtracting prior quarters of a
    /// cumulative window. `None` if a prior quarter is unresolved.
    pub(crate) fn isolate(&self, value: f64, resolved: &QuarterValues) -> Option<f64> {
        match self {
            Self::Standalone(_) => Some(value),
            Self::YearToDate(q) => subtract_preceding(value, *q, resolved),
        }
    }
}

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Classifies an observation against a target year by fiscal period and the
/// months its window starts and ends in.
///
/// The stand-alone start months (March/April for Q2, June/July for Q3,
/// September/October for Q4) cover fiscal calendars offset by about a month
/// from the calendar year. Other fiscal calendars are not recognized.
pub(crate) fn classify(obs: &Observation, year: i32) -> Option<ReportingWindow> {
    let starts = |month: u32| in_month(obs.period_start(), year, month);
    let ends = |month: u32| in_month(obs.period_end(), year, month);

    let (quarter, end_month, standalone_starts): (Quarter, u32, [u32; 2]) =
        match obs.fiscal_period() {
            FiscalPeriod::Q1 => (Quarter::Q1, 3, [1, 1]),
            FiscalPeriod::Q2 => (Quarter::Q2, 6, [3, 4]),
            FiscalPeriod::Q3 => (Quarter::Q3, 9, [6, 7]),
            FiscalPeriod::FullYear => (Quarter::Q4, 12, [9, 10]),
            FiscalPeriod::Q4 | FiscalPeriod::Unspecified => return None,
        };

    if !ends(end_month) {
        return None;
    }
    if quarter == Quarter::Q1 {
        return starts(1).then_some(ReportingWindow::Standalone(Quarter::Q1));
    }
    if starts(1) {
        Some(ReportingWindow::YearToDate(quarter))
    } else if standalone_starts.into_iter().any(starts) {
        Some(ReportingWindow::Standalone(quarter))
    } else {
        None
    }
}

/// Frame label implied by a frameless observation, for the year its window
/// ends in.
///
/// Only windows that map onto a single label without subtraction get one:
/// stand-alone Q1-Q3 windows and calendar full years.
pub(crate) fn synthetic_label(obs: &Observation) -> Option<PeriodLabel> {
    let year = obs.period_end().year();
    match classify(obs, year)? {
        ReportingWindow::Standalone(Quarter::Q4) => None,
        ReportingWindow::Standalone(q) => Some(PeriodLabel::quarter(year, q)),
        ReportingWindow::YearToDate(Quarter::Q4) => Some(PeriodLabel::annual(year)),
        ReportingWindow::YearToDate(_) => None,
    }
}

/// `cumulative` minus every quarter before `quarter`, rounded to 4 places.
pub(crate) fn subtract_preceding(
    cumulative: f64,
    quarter: Quarter,
    resolved: &QuarterValues,
) -> Option<f64> {
    let prior: Option<f64> = quarter
        .preceding()
        .iter()
        .map(|q| resolved.get(q).copied())
        .sum();
    Some(round4(cumulative - prior?))
}

/// Rounds to 4 decimal places.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{date, obs};
    use facts_core::FilingForm;

    #[test]
    fn test_classify_first_quarter() {
        let o = obs(1.0, "10-Q", date(2023, 1, 1), date(2023, 3, 31), "Q1", None);
        assert_eq!(
            classify(&o, 2023),
            Some(ReportingWindow::Standalone(Quarter::Q1))
        );
        assert_eq!(classify(&o, 2022), None);
    }

    #[test]
    fn test_classify_cumulative_and_standalone() {
        let ytd = obs(2.0, "10-Q", date(2023, 1, 1), date(2023, 6, 30), "Q2", None);
        assert_eq!(
            classify(&ytd, 2023),
            Some(ReportingWindow::YearToDate(Quarter::Q2))
        );

        let march = obs(1.0, "10-Q", date(2023, 3, 26), date(2023, 6, 24), "Q2", None);
        let april = obs(1.0, "10-Q", date(2023, 4, 1), date(2023, 6, 30), "Q2", None);
        assert_eq!(
            classify(&march, 2023),
            Some(ReportingWindow::Standalone(Quarter::Q2))
        );
        assert_eq!(
            classify(&april, 2023),
            Some(ReportingWindow::Standalone(Quarter::Q2))
        );

        let october = obs(1.0, "10-K", date(2023, 10, 1), date(2023, 12, 31), "FY", None);
        assert_eq!(
            classify(&october, 2023),
            Some(ReportingWindow::Standalone(Quarter::Q4))
        );
    }

    #[test]
    fn test_classify_every_standalone_start_month() {
        let cases = [
            ("Q2", date(2023, 3, 26), date(2023, 6, 24), Quarter::Q2),
            ("Q2", date(2023, 4, 1), date(2023, 6, 30), Quarter::Q2),
            ("Q3", date(2023, 6, 25), date(2023, 9, 30), Quarter::Q3),
            ("Q3", date(2023, 7, 1), date(2023, 9, 30), Quarter::Q3),
            ("FY", date(2023, 9, 30), date(2023, 12, 30), Quarter::Q4),
            ("FY", date(2023, 10, 1), date(2023, 12, 31), Quarter::Q4),
        ];

        for (fp, start, end, quarter) in cases {
            let form = if fp == "FY" { "10-K" } else { "10-Q" };
            let o = obs(1.0, form, start, end, fp, None);
            assert_eq!(
                classify(&o, 2023),
                Some(ReportingWindow::Standalone(quarter)),
                "{fp} window starting {start}"
            );
        }

        // one month early for each quarter is not recognized
        let o = obs(1.0, "10-Q", date(2023, 5, 28), date(2023, 9, 30), "Q3", None);
        assert_eq!(classify(&o, 2023), None);
        let o = obs(1.0, "10-K", date(2023, 8, 27), date(2023, 12, 31), "FY", None);
        assert_eq!(classify(&o, 2023), None);
    }

    #[test]
    fn test_classify_rejects_mismatched_windows() {
        // fiscal period disagrees with the end month
        let o = obs(1.0, "10-Q", date(2023, 1, 1), date(2023, 9, 30), "Q2", None);
        assert_eq!(classify(&o, 2023), None);

        // start month outside every recognized branch
        let o = obs(1.0, "10-Q", date(2023, 2, 1), date(2023, 6, 30), "Q2", None);
        assert_eq!(classify(&o, 2023), None);

        let o = obs(1.0, "10-Q", date(2023, 1, 1), date(2023, 3, 31), "", None);
        assert_eq!(classify(&o, 2023), None);
    }

    #[test]
    fn test_synthetic_label() {
        let q3 = obs(9.0, "10-Q", date(2023, 7, 1), date(2023, 9, 30), "Q3", None);
        assert_eq!(
            synthetic_label(&q3),
            Some(PeriodLabel::quarter(2023, Quarter::Q3))
        );

        let fy = obs(50.0, "10-K", date(2023, 1, 1), date(2023, 12, 31), "FY", None);
        assert_eq!(synthetic_label(&fy), Some(PeriodLabel::annual(2023)));

        let ytd = obs(22.0, "10-Q", date(2023, 1, 1), date(2023, 6, 30), "Q2", None);
        assert_eq!(synthetic_label(&ytd), None);
        assert_eq!(ytd.form(), FilingForm::QuarterlyReport);
    }

    #[test]
    fn test_subtract_preceding_requires_every_prior_quarter() {
        let resolved = QuarterValues::from([(Quarter::Q1, 1.0), (Quarter::Q3, 1.0)]);
        assert_eq!(subtract_preceding(3.0, Quarter::Q4, &resolved), None);
        assert_eq!(subtract_preceding(3.0, Quarter::Q2, &resolved), Some(2.0));
        assert_eq!(subtract_preceding(3.0, Quarter::Q1, &resolved), Some(3.0));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.0 - (0.1 + 0.2 + 0.3)), 0.4);
        assert_eq!(round4(-0.123_456), -0.1235);
    }
}
