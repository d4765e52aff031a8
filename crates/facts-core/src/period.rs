//! Filing and period vocabulary.
//!
//! This module defines [`FilingForm`] and [`FiscalPeriod`] as reported by a
//! filing, [`Quarter`] for the output slots of a derived series, and
//! [`PeriodLabel`] for chronological comparison of standardized frame labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Form type of the filing an observation was disclosed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingForm {
    /// Quarterly report (10-Q).
    QuarterlyReport,
    /// Annual report (10-K).
    AnnualReport,
    /// Any other form, including amendments.
    Other,
}

impl FilingForm {
    /// Parses an SEC form designation, ignoring case.
    ///
    /// Only the plain `10-Q` and `10-K` forms are recognized; amendments such
    /// as `10-Q/A` map to [`FilingForm::Other`].
    #[must_use]
    pub fn parse(form: &str) -> Self {
        let form = form.trim();
        if form.eq_ignore_ascii_case("10-Q") {
            Self::QuarterlyReport
        } else if form.eq_ignore_ascii_case("10-K") {
            Self::AnnualReport
        } else {
            Self::Other
        }
    }

    /// Returns true for quarterly and annual reports.
    #[must_use]
    pub const fn is_periodic_report(&self) -> bool {
        matches!(self, Self::QuarterlyReport | Self::AnnualReport)
    }
}

/// A filing's self-reported fiscal period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FullYear,
    /// Missing or unrecognized designation.
    #[default]
    Unspecified,
}

impl FiscalPeriod {
    /// Parses a fiscal period designation (`Q1`..`Q4`, `FY`), ignoring case.
    #[must_use]
    pub fn parse(fp: &str) -> Self {
        match fp.trim().to_ascii_uppercase().as_str() {
            "Q1" => Self::Q1,
            "Q2" => Self::Q2,
            "Q3" => Self::Q3,
            "Q4" => Self::Q4,
            "FY" => Self::FullYear,
            _ => Self::Unspecified,
        }
    }
}

/// A calendar quarter slot in a derived series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    /// January through March.
    Q1,
    /// April through June.
    Q2,
    /// July through September.
    Q3,
    /// October through December.
    Q4,
}

impl Quarter {
    /// All quarters in chronological order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Returns the quarter number (1-4).
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Returns the quarter for a number in 1-4.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Q1),
            2 => Some(Self::Q2),
            3 => Some(Self::Q3),
            4 => Some(Self::Q4),
            _ => None,
        }
    }

    /// Returns the series tag (`q1`..`q4`).
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Q1 => "q1",
            Self::Q2 => "q2",
            Self::Q3 => "q3",
            Self::Q4 => "q4",
        }
    }

    /// Quarters of the same year that come before this one.
    #[must_use]
    pub const fn preceding(&self) -> &'static [Self] {
        match self {
            Self::Q1 => &[],
            Self::Q2 => &[Self::Q1],
            Self::Q3 => &[Self::Q1, Self::Q2],
            Self::Q4 => &[Self::Q1, Self::Q2, Self::Q3],
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Chronological key of a standardized frame label.
///
/// `CY2023Q2` parses to `(2023, 2)` and the full-year frame `CY2023` to
/// `(2023, 5)`, so a year's quarters order before its annual frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodLabel {
    /// Calendar year.
    pub year: i32,
    /// 1-4 for quarterly frames, 5 for the annual frame.
    pub quarter_rank: u8,
}

impl PeriodLabel {
    /// Rank used for full-year frames.
    pub const ANNUAL_RANK: u8 = 5;

    /// Label for a single calendar quarter.
    #[must_use]
    pub const fn quarter(year: i32, quarter: Quarter) -> Self {
        Self {
            year,
            quarter_rank: quarter.number(),
        }
    }

    /// Label for a full calendar year.
    #[must_use]
    pub const fn annual(year: i32) -> Self {
        Self {
            year,
            quarter_rank: Self::ANNUAL_RANK,
        }
    }

    /// Parses `CY{yyyy}` or `CY{yyyy}Q{n}`, ignoring case.
    ///
    /// Instant frames (`CY2023Q1I`) and any other format return `None`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let prefix = label.get(..2)?;
        if !prefix.eq_ignore_ascii_case("cy") {
            return None;
        }
        let year = label.get(2..6)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = year.parse().ok()?;

        let quarter_rank = match label.get(6..)?.as_bytes() {
            [] => Self::ANNUAL_RANK,
            [q, d @ b'1'..=b'4'] if q.eq_ignore_ascii_case(&b'q') => d - b'0',
            _ => return None,
        };

        Some(Self { year, quarter_rank })
    }

    /// Returns true for a full-year frame.
    #[must_use]
    pub const fn is_annual(&self) -> bool {
        self.quarter_rank == Self::ANNUAL_RANK
    }

    /// Returns the quarter of a quarterly frame.
    #[must_use]
    pub const fn as_quarter(&self) -> Option<Quarter> {
        Quarter::from_number(self.quarter_rank)
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_quarter() {
            Some(q) => write!(f, "CY{}Q{}", self.year, q.number()),
            None => write!(f, "CY{}", self.year),
        }
    }
}
