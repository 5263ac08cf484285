//! Ranking/Share Calculator
//!
//! Percentage share of each labeled value against the set total, sorted
//! by value (largest first). Used by the virus pie, the continent bars
//! and the per-country ranking.

use crate::records::VirusDateCountryIndex;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// One labeled value with its share of the total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareEntry {
    pub label: String,
    pub value: f64,
    /// `value / total * 100`, rounded to one decimal, in [0, 100]
    pub percent_of_total: f64,
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute shares for a labeled set
///
/// A zero total yields `0.0` for every entry. Entries are sorted by
/// value descending; equal values keep their input order.
pub fn compute_shares<I, S>(items: I) -> Vec<ShareEntry>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let items: Vec<(String, f64)> = items.into_iter().map(|(l, v)| (l.into(), v)).collect();
    let total: f64 = items.iter().map(|(_, v)| v).sum();

    let mut entries: Vec<ShareEntry> = items
        .into_iter()
        .map(|(label, value)| ShareEntry {
            percent_of_total: if total == 0.0 {
                0.0
            } else {
                round1(value / total * 100.0)
            },
            label,
            value,
        })
        .collect();

    // sort_by is stable: ties keep first-seen order
    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    entries
}

/// True for labels the remote API uses for unassigned rows
pub fn is_unknown_label(label: &str) -> bool {
    let label = label.trim();
    label.is_empty()
        || label.eq_ignore_ascii_case("unknown")
        || label.eq_ignore_ascii_case("inconnu")
}

/// Continent shares, ignoring rows without a real continent
pub fn continent_shares<I, S>(items: I) -> Vec<ShareEntry>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    compute_shares(
        items
            .into_iter()
            .map(|(label, value)| (Into::<String>::into(label), value))
            .filter(|(label, _)| !is_unknown_label(label)),
    )
}

/// Rank countries by cases for one virus on one day
///
/// `search` filters case-insensitively on the country code or, when
/// `names` knows the code, on the country's display name.
pub fn rank_countries(
    index: &VirusDateCountryIndex,
    virus: &str,
    date: NaiveDate,
    search: Option<&str>,
    names: &HashMap<String, String>,
) -> Vec<ShareEntry> {
    let Some(countries) = index.cases_on(virus, date) else {
        return Vec::new();
    };

    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    compute_shares(
        countries
            .iter()
            .filter(|(code, _)| match &needle {
                None => true,
                Some(needle) => {
                    code.to_lowercase().contains(needle.as_str())
                        || names
                            .get(code.as_str())
                            .map(|n| n.to_lowercase().contains(needle.as_str()))
                            .unwrap_or(false)
                }
            })
            .map(|(code, cases)| (code.clone(), *cases as f64)),
    )
}
