//! Virus and date selection helpers

use crate::records::VirusDateCountryIndex;
use chrono::NaiveDate;
use serde::Serialize;

/// Virus shown when the caller does not pick one
///
/// `preferred` wins when the index knows it; otherwise the first virus in
/// key order. `None` only for an empty index.
pub fn default_virus(index: &VirusDateCountryIndex, preferred: &str) -> Option<String> {
    if index.contains_virus(preferred) {
        return Some(preferred.to_string());
    }
    index.viruses().next().map(str::to_string)
}

/// Position within the known dates of one virus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCursor {
    dates: Vec<NaiveDate>,
    position: usize,
}

impl DateCursor {
    /// Cursor over `virus`, placed on `requested` when it is a known date
    /// and on the first known date otherwise. `None` when the virus has
    /// no dates.
    pub fn new(
        index: &VirusDateCountryIndex,
        virus: &str,
        requested: Option<NaiveDate>,
    ) -> Option<Self> {
        let dates = index.dates_for(virus);
        if dates.is_empty() {
            return None;
        }
        let position = requested
            .and_then(|d| dates.binary_search(&d).ok())
            .unwrap_or(0);
        Some(Self { dates, position })
    }

    pub fn current(&self) -> NaiveDate {
        self.dates[self.position]
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Date before the current one, if any
    pub fn previous(&self) -> Option<NaiveDate> {
        self.position
            .checked_sub(1)
            .map(|i| self.dates[i])
    }

    /// Date after the current one, if any
    pub fn next(&self) -> Option<NaiveDate> {
        self.dates.get(self.position + 1).copied()
    }

    /// Move one step back; stays put at the first date
    pub fn step_back(&mut self) -> NaiveDate {
        self.position = self.position.saturating_sub(1);
        self.current()
    }

    /// Move one step forward; stays put at the last date
    pub fn step_forward(&mut self) -> NaiveDate {
        if self.position + 1 < self.dates.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
