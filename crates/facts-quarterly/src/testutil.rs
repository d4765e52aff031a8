use chrono::NaiveDate;
use facts_core::{FilingForm, FiscalPeriod, MetricFactSet, Observation};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn obs(
    value: f64,
    form: &str,
    start: NaiveDate,
    end: NaiveDate,
    fp: &str,
    frame: Option<&str>,
) -> Observation {
    let o = Observation::new(
        value,
        FilingForm::parse(form),
        start,
        end,
        FiscalPeriod::parse(fp),
    )
    .unwrap();
    match frame {
        Some(label) => o.with_frame_label(label),
        None => o,
    }
}

/// A framed observation for one calendar quarter of `year`.
pub(crate) fn framed_quarter(value: f64, year: i32, quarter: u32) -> Observation {
    let start = date(year, 3 * quarter - 2, 1);
    let end = match quarter {
        1 => date(year, 3, 31),
        2 => date(year, 6, 30),
        3 => date(year, 9, 30),
        _ => date(year, 12, 31),
    };
    let fp = format!("Q{quarter}");
    obs(
        value,
        "10-Q",
        start,
        end,
        &fp,
        Some(&format!("CY{year}Q{quarter}")),
    )
}

/// A framed full calendar year observation.
pub(crate) fn framed_year(value: f64, year: i32) -> Observation {
    obs(
        value,
        "10-K",
        date(year, 1, 1),
        date(year, 12, 31),
        "FY",
        Some(&format!("CY{year}")),
    )
}

pub(crate) fn facts(observations: Vec<Observation>) -> MetricFactSet {
    MetricFactSet::from_observations(observations)
}
