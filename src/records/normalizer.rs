//! Record Normalizer
//!
//! Folds case records into a nested `virus → date → country → cases`
//! lookup. Ordered maps keep viruses, days and countries in ascending
//! key order so every derived view is deterministic.

use super::types::{CaseRecord, RawCaseRecord, UNKNOWN_VIRUS};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Cases per country for a single day
pub type CountryCases = BTreeMap<String, u64>;

/// Nested lookup of cumulative cases keyed by virus, day and country
///
/// Each (virus, day, country) triple holds at most one value. Inserting
/// the same triple again overwrites the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VirusDateCountryIndex {
    entries: BTreeMap<String, BTreeMap<NaiveDate, CountryCases>>,
}

impl VirusDateCountryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from validated records, in iteration order
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CaseRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Insert one record (last write wins for a repeated triple)
    pub fn insert(&mut self, record: &CaseRecord) {
        let virus = if record.virus_name.trim().is_empty() {
            UNKNOWN_VIRUS.to_string()
        } else {
            record.virus_name.clone()
        };

        self.entries
            .entry(virus)
            .or_default()
            .entry(record.date)
            .or_default()
            .insert(record.country_code.to_uppercase(), record.total_cases);
    }

    /// True when no record has been indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Virus names in ascending order
    pub fn viruses(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Check whether a virus has any data
    pub fn contains_virus(&self, virus: &str) -> bool {
        self.entries.contains_key(virus)
    }

    /// Days with data for a virus, ascending
    pub fn dates_for(&self, virus: &str) -> Vec<NaiveDate> {
        self.entries
            .get(virus)
            .map(|dates| dates.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Per-country cases for a virus on one day
    pub fn cases_on(&self, virus: &str, date: NaiveDate) -> Option<&CountryCases> {
        self.entries.get(virus)?.get(&date)
    }

    /// Cases for one (virus, day, country) triple
    pub fn cases_for(&self, virus: &str, date: NaiveDate, country_code: &str) -> Option<u64> {
        self.cases_on(virus, date)?
            .get(&country_code.to_uppercase())
            .copied()
    }

    /// Iterate `(virus, day, countries)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate, &CountryCases)> {
        self.entries.iter().flat_map(|(virus, dates)| {
            dates
                .iter()
                .map(move |(date, countries)| (virus.as_str(), *date, countries))
        })
    }

    /// Number of distinct (virus, day, country) triples
    pub fn record_count(&self) -> usize {
        self.iter().map(|(_, _, countries)| countries.len()).sum()
    }

    /// Sum of every case value recorded for a virus
    pub fn total_for(&self, virus: &str) -> u64 {
        self.entries
            .get(virus)
            .map(|dates| dates.values().flat_map(|c| c.values()).sum())
            .unwrap_or(0)
    }
}

/// Normalize raw API rows into a [`VirusDateCountryIndex`]
///
/// Rows missing a required field are skipped without error so one bad
/// row never blocks the dashboard.
pub fn normalize(records: &[RawCaseRecord]) -> VirusDateCountryIndex {
    let mut index = VirusDateCountryIndex::new();
    let mut skipped = 0usize;

    for raw in records {
        match raw.to_case_record() {
            Some(record) => index.insert(&record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(
            total = records.len(),
            skipped,
            "Skipped malformed case records"
        );
    }

    index
}
