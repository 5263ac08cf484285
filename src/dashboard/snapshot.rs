//! Dashboard snapshot
//!
//! A snapshot is built in one pass from a single fetch round and never
//! mutated afterwards. The service publishes a new one by swapping an
//! `Arc`, so readers always see a complete set of derived views.

use super::selection::{default_virus, DateCursor};
use crate::analytics::{
    compute_shares, map_layer, monthly_totals, rank_countries, yearly_evolution, MapCell,
    MonthlyVirusTotals, ShareEntry, YearlyTotal,
};
use crate::records::{normalize, RawCaseRecord, VirusDateCountryIndex};
use crate::remote::{Country, VirusTotal};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

/// Immutable bundle of derived dashboard data
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub index: VirusDateCountryIndex,
    pub monthly: Vec<MonthlyVirusTotals>,
    pub virus_shares: Vec<ShareEntry>,
    /// Alpha-2 code to display name
    pub country_names: HashMap<String, String>,
    pub default_virus: Option<String>,
    pub built_at: DateTime<Utc>,
    /// Generation of the refresh that produced this snapshot
    pub generation: u64,
    /// False until a refresh has been published
    pub loaded: bool,
}

impl DashboardSnapshot {
    /// Placeholder served before the first refresh completes
    pub fn empty() -> Self {
        Self {
            index: VirusDateCountryIndex::new(),
            monthly: Vec::new(),
            virus_shares: Vec::new(),
            country_names: HashMap::new(),
            default_virus: None,
            built_at: Utc::now(),
            generation: 0,
            loaded: false,
        }
    }

    /// Derive every view from one fetch round
    pub fn build(
        records: &[RawCaseRecord],
        virus_totals: &[VirusTotal],
        countries: &[Country],
        preferred_virus: &str,
        generation: u64,
    ) -> Self {
        let index = normalize(records);
        let monthly = monthly_totals(&index);
        let virus_shares = compute_shares(virus_totals.iter().map(VirusTotal::share_item));
        let country_names = countries
            .iter()
            .map(|c| (c.alpha2.to_uppercase(), c.name.clone()))
            .collect();
        let default_virus = default_virus(&index, preferred_virus);

        Self {
            index,
            monthly,
            virus_shares,
            country_names,
            default_virus,
            built_at: Utc::now(),
            generation,
            loaded: true,
        }
    }

    /// Requested virus, or the default one
    pub fn resolve_virus(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_virus.clone())
    }

    pub fn viruses(&self) -> Vec<String> {
        self.index.viruses().map(str::to_string).collect()
    }

    pub fn date_cursor(&self, virus: &str, requested: Option<NaiveDate>) -> Option<DateCursor> {
        DateCursor::new(&self.index, virus, requested)
    }

    pub fn map_layer(&self, virus: &str, date: NaiveDate) -> BTreeMap<String, MapCell> {
        map_layer(&self.index, virus, date)
    }

    pub fn country_ranking(
        &self,
        virus: &str,
        date: NaiveDate,
        search: Option<&str>,
    ) -> Vec<ShareEntry> {
        rank_countries(&self.index, virus, date, search, &self.country_names)
    }

    pub fn evolution(&self, virus: &str) -> Vec<YearlyTotal> {
        yearly_evolution(&self.index, virus)
    }

    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.country_names.get(&code.to_uppercase()).map(String::as_str)
    }
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
