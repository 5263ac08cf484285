//! Temporal Aggregator
//!
//! Folds the per-day, per-country index into per-month totals for the
//! trend chart, and per-year totals for the evolution view.

use super::projection::TrendDirection;
use super::share::round1;
use crate::records::VirusDateCountryIndex;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Summed cases per virus for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyVirusTotals {
    /// Month key, "YYYY-MM"
    pub month: String,
    /// Cases summed over every day and country of the month, per virus
    pub per_virus_total: BTreeMap<String, u64>,
}

/// Aggregate the index into month rows, ascending by month
///
/// For each (virus, day) the country values are summed, then added to
/// that virus' running total for the day's month. Zero-padded month
/// keys make the lexicographic order chronological.
pub fn monthly_totals(index: &VirusDateCountryIndex) -> Vec<MonthlyVirusTotals> {
    let mut grouped: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for (virus, date, countries) in index.iter() {
        let day_total: u64 = countries.values().sum();
        let month = date.format("%Y-%m").to_string();

        *grouped
            .entry(month)
            .or_default()
            .entry(virus.to_string())
            .or_insert(0) += day_total;
    }

    grouped
        .into_iter()
        .map(|(month, per_virus_total)| MonthlyVirusTotals {
            month,
            per_virus_total,
        })
        .collect()
}

/// Render month rows as CSV, one column per virus
///
/// Viruses absent from a month are written as `0`.
pub fn monthly_totals_csv(rows: &[MonthlyVirusTotals]) -> Result<String, csv::Error> {
    let viruses: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.per_virus_total.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["month"];
    header.extend(viruses.iter().copied());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.month.clone()];
        record.extend(
            viruses
                .iter()
                .map(|v| row.per_virus_total.get(*v).copied().unwrap_or(0).to_string()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Total cases of one virus for a calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTotal {
    pub year: i32,
    pub cases: u64,
    /// Change against the previous year in percent (one decimal)
    pub change_percent: Option<f64>,
    /// Direction against the previous year
    pub direction: Option<TrendDirection>,
}

/// Per-year totals for one virus with year-over-year change
///
/// The first year, and any year following a zero-case year, carries no
/// percentage.
pub fn yearly_evolution(index: &VirusDateCountryIndex, virus: &str) -> Vec<YearlyTotal> {
    let mut per_year: BTreeMap<i32, u64> = BTreeMap::new();

    for (name, date, countries) in index.iter() {
        if name == virus {
            *per_year.entry(date.year()).or_insert(0) += countries.values().sum::<u64>();
        }
    }

    let mut previous: Option<u64> = None;
    per_year
        .into_iter()
        .map(|(year, cases)| {
            let (change_percent, direction) = match previous {
                Some(prev) => {
                    let diff = cases as f64 - prev as f64;
                    let percent = (prev > 0).then(|| round1(diff / prev as f64 * 100.0));
                    (percent, Some(TrendDirection::from_change(diff)))
                }
                None => (None, None),
            };
            previous = Some(cases);

            YearlyTotal {
                year,
                cases,
                change_percent,
                direction,
            }
        })
        .collect()
}
