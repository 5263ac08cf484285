//! Dashboard Service
//!
//! Fetches from the remote source, builds snapshots and answers the
//! on-demand views (continent shares, country drill-down).
//!
//! Each data source is fetched independently; a failed source is logged
//! and replaced by an empty result so the others still render. Every
//! fetch carries a generation ticket and its result is dropped if a newer
//! fetch for the same resource was started meanwhile.
//!
//! Continent and country views are cached in bounded LRU maps that are
//! emptied whenever a new snapshot is published.

use super::cache::ViewCache;
use super::country::{CountryDetail, CountryInputs};
use super::generation::{GenerationTracker, ResourceKey};
use super::snapshot::DashboardSnapshot;
use crate::analytics::{continent_shares, ShareEntry};
use crate::remote::{ContinentTotal, PandemicSource, RemoteError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Runtime settings of the dashboard service
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Virus selected when the caller names none and the data has it
    pub preferred_virus: String,
    /// Background refresh period in seconds; 0 disables it
    pub refresh_interval_secs: u64,
    /// Entries kept in each of the continent and country view caches
    pub cache_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preferred_virus: "COVID-19".to_string(),
            refresh_interval_secs: 300,
            cache_capacity: 256,
        }
    }
}

/// Outcome of one refresh round
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub generation: u64,
    /// False when a newer refresh overtook this one
    pub published: bool,
    pub record_count: usize,
    pub failed_sources: Vec<&'static str>,
    pub duration_ms: u64,
}

type DetailKey = (String, String);

/// Owns the published snapshot and the on-demand caches
pub struct DashboardService {
    source: Arc<dyn PandemicSource>,
    config: DashboardConfig,
    snapshot: RwLock<Arc<DashboardSnapshot>>,
    generations: GenerationTracker<ResourceKey>,
    continents: Mutex<ViewCache<String, Vec<ShareEntry>>>,
    details: Mutex<ViewCache<DetailKey, CountryDetail>>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn PandemicSource>, config: DashboardConfig) -> Self {
        let capacity = config.cache_capacity;
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(DashboardSnapshot::empty())),
            generations: GenerationTracker::new(),
            continents: Mutex::new(ViewCache::new(capacity)),
            details: Mutex::new(ViewCache::new(capacity)),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Currently published snapshot
    pub async fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Fetch case records, virus totals and country names, then publish
    /// a new snapshot unless a newer refresh has started
    pub async fn refresh(&self) -> RefreshReport {
        let start = Instant::now();
        let ticket = self.generations.begin(ResourceKey::Snapshot);

        let (records, totals, countries) = tokio::join!(
            self.source.case_records(),
            self.source.virus_totals(),
            self.source.countries(),
        );

        let mut failed = Vec::new();
        let records = or_empty(records, "case_records", &mut failed);
        let totals = or_empty(totals, "virus_totals", &mut failed);
        let countries = or_empty(countries, "countries", &mut failed);

        let snapshot = DashboardSnapshot::build(
            &records,
            &totals,
            &countries,
            &self.config.preferred_virus,
            ticket.generation,
        );
        let record_count = snapshot.index.record_count();

        let published = {
            let mut current = self.snapshot.write().await;
            let publish =
                self.generations.is_current(&ticket) && ticket.generation > current.generation;
            self.generations.finish(&ticket);
            if publish {
                *current = Arc::new(snapshot);
            }
            publish
        };

        if published {
            // Views fetched before this round may predate the new data
            self.continents.lock().await.clear_before(ticket.generation);
            self.details.lock().await.clear_before(ticket.generation);
        }

        let report = RefreshReport {
            generation: ticket.generation,
            published,
            record_count,
            failed_sources: failed,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        if published {
            tracing::info!(
                generation = report.generation,
                records = report.record_count,
                failed = report.failed_sources.len(),
                duration_ms = report.duration_ms,
                "Dashboard snapshot published"
            );
        } else {
            tracing::debug!(
                generation = report.generation,
                "Discarding superseded snapshot"
            );
        }

        report
    }

    /// Continent shares for one virus, unknown continents excluded
    pub async fn continent_shares(&self, virus: &str) -> Arc<Vec<ShareEntry>> {
        let ticket = self.generations.begin(ResourceKey::ContinentTotals {
            virus: virus.to_string(),
        });

        let mut failed = Vec::new();
        let totals = or_empty(
            self.source.continent_totals(virus).await,
            "continent_totals",
            &mut failed,
        );
        let shares = Arc::new(continent_shares(totals.iter().map(ContinentTotal::share_item)));

        let mut cache = self.continents.lock().await;
        let current = self.generations.is_current(&ticket);
        self.generations.finish(&ticket);
        if current {
            cache.insert(virus.to_string(), ticket.generation, Arc::clone(&shares));
            shares
        } else {
            tracing::debug!(key = %ticket.key, generation = ticket.generation, "Discarding stale response");
            cache
                .newer_than(&virus.to_string(), ticket.generation)
                .unwrap_or(shares)
        }
    }

    /// Drill-down for one country, its five sources fetched concurrently
    pub async fn country_detail(&self, country_code: &str, virus: &str) -> Arc<CountryDetail> {
        let code = country_code.trim().to_uppercase();
        let ticket = self.generations.begin(ResourceKey::CountryDetail {
            country: code.clone(),
            virus: virus.to_string(),
        });

        let (history, predictions, mortality, transmission, population) = tokio::join!(
            self.source.country_history(&code, virus),
            self.source.predictions(virus, &code),
            self.source.mortality_rates(virus, &code),
            self.source.transmission_rates(virus, &code),
            self.source.population(&code),
        );

        let mut failed = Vec::new();
        let inputs = CountryInputs {
            history: or_empty(history, "country_history", &mut failed),
            predictions: or_empty(predictions, "predictions", &mut failed),
            mortality: or_empty(mortality, "mortality_rates", &mut failed),
            transmission: or_empty(transmission, "transmission_rates", &mut failed),
            population: or_empty(population, "population", &mut failed),
        };
        let detail = Arc::new(CountryDetail::assemble(&code, virus, inputs));

        let key = (code, virus.to_string());
        let mut cache = self.details.lock().await;
        let current = self.generations.is_current(&ticket);
        self.generations.finish(&ticket);
        if current {
            cache.insert(key, ticket.generation, Arc::clone(&detail));
            detail
        } else {
            tracing::debug!(key = %ticket.key, generation = ticket.generation, "Discarding stale response");
            cache.newer_than(&key, ticket.generation).unwrap_or(detail)
        }
    }

    /// Spawn the periodic refresh loop
    ///
    /// Returns `None` when `refresh_interval_secs` is 0.
    pub fn start_background_refresh(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if self.config.refresh_interval_secs == 0 {
            tracing::info!("Periodic dashboard refresh disabled");
            return None;
        }

        tracing::info!(
            interval_secs = self.config.refresh_interval_secs,
            "Starting periodic dashboard refresh"
        );

        Some(tokio::spawn(async move {
            let interval = std::time::Duration::from_secs(self.config.refresh_interval_secs);
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::debug!("Running scheduled dashboard refresh");
                self.refresh().await;
            }
        }))
    }
}

/// Unwrap a source result, logging and substituting the empty value on
/// failure
fn or_empty<T: Default>(
    result: Result<T, RemoteError>,
    source: &'static str,
    failed: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(source, error = %e, "Remote fetch failed, using empty data");
            failed.push(source);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::VirusTotal;
    use crate::testing::FakeSource;
    use crate::records::RawCaseRecord;

    fn source() -> FakeSource {
        FakeSource {
            records: vec![
                RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 120),
                RawCaseRecord::new("FR", "2020-03-15", "COVID-19", 130),
            ],
            virus_totals: vec![VirusTotal {
                virus: Some("COVID-19".into()),
                total_cases: Some(250),
                ..Default::default()
            }],
            continents: vec![
                ContinentTotal {
                    continent: Some("Europe".into()),
                    total_cases: Some(300),
                    ..Default::default()
                },
                ContinentTotal {
                    continent: Some("Inconnu".into()),
                    total_cases: Some(900),
                    ..Default::default()
                },
            ],
            history: vec![
                RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 100),
                RawCaseRecord::new("FR", "2020-03-02", "COVID-19", 150),
            ],
            population: Some(67_000_000),
            ..Default::default()
        }
    }

    fn service(source: FakeSource) -> DashboardService {
        DashboardService::new(Arc::new(source), DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let service = service(source());
        assert!(!service.snapshot().await.loaded);

        let report = service.refresh().await;
        assert!(report.published);
        assert!(report.failed_sources.is_empty());

        let snapshot = service.snapshot().await;
        assert!(snapshot.loaded);
        assert_eq!(snapshot.monthly[0].month, "2020-03");
        assert_eq!(snapshot.monthly[0].per_virus_total["COVID-19"], 250);
        assert_eq!(snapshot.virus_shares[0].percent_of_total, 100.0);
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let mut source = source();
        source.failing.insert("virus_totals");
        let service = service(source);

        let report = service.refresh().await;
        assert!(report.published);
        assert_eq!(report.failed_sources, vec!["virus_totals"]);

        let snapshot = service.snapshot().await;
        assert!(snapshot.virus_shares.is_empty());
        assert_eq!(snapshot.index.record_count(), 2);
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_discarded() {
        let mut source = source();
        source.slow_first.insert("case_records");
        let service = service(source);

        let (first, second) = tokio::join!(service.refresh(), service.refresh());

        assert!(!first.published);
        assert!(second.published);
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.generation, second.generation);
        assert_eq!(snapshot.index.record_count(), 2);
    }

    #[tokio::test]
    async fn test_continent_shares_drop_unknown() {
        let service = service(source());
        let shares = service.continent_shares("COVID-19").await;
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].label, "Europe");
        assert_eq!(shares[0].percent_of_total, 100.0);
    }

    #[tokio::test]
    async fn test_stale_continent_response_yields_newer() {
        let mut source = source();
        source.slow_first.insert("continent_totals");
        let service = service(source);

        let (stale, fresh) = tokio::join!(
            service.continent_shares("COVID-19"),
            service.continent_shares("COVID-19")
        );

        assert_eq!(fresh.len(), 1);
        assert_eq!(stale, fresh);
    }

    fn continent(name: &str, total: i64) -> ContinentTotal {
        ContinentTotal {
            continent: Some(name.into()),
            total_cases: Some(total),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stale_response_keeps_own_data_over_older_cache() {
        let mut source = source();
        source.continent_rounds = vec![
            vec![continent("Europe", 300)],
            vec![continent("Europe", 300), continent("Asia", 100)],
            vec![continent("Asia", 50)],
        ];
        source.delays_ms.insert("continent_totals", vec![0, 20, 80]);
        let service = service(source);

        let first = service.continent_shares("COVID-19").await;
        assert_eq!(first.len(), 1);

        // The second call finishes first but is superseded; the cache only
        // holds the first round, which is older than its own answer
        let (second, third) = tokio::join!(
            service.continent_shares("COVID-19"),
            service.continent_shares("COVID-19")
        );

        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].label, "Asia");
    }

    #[tokio::test]
    async fn test_stale_country_detail_yields_newer() {
        let mut source = source();
        source.history_rounds = vec![
            vec![RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 100)],
            vec![
                RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 100),
                RawCaseRecord::new("FR", "2020-03-02", "COVID-19", 150),
            ],
        ];
        source.delays_ms.insert("country_history", vec![60, 0]);
        let service = service(source);

        let (stale, fresh) = tokio::join!(
            service.country_detail("FR", "COVID-19"),
            service.country_detail("FR", "COVID-19")
        );

        assert_eq!(fresh.history.len(), 2);
        assert!(Arc::ptr_eq(&stale, &fresh));
    }

    #[tokio::test]
    async fn test_view_caches_are_bounded() {
        let service = DashboardService::new(
            Arc::new(source()),
            DashboardConfig {
                cache_capacity: 4,
                ..Default::default()
            },
        );

        for i in 0..50 {
            service.country_detail(&format!("C{}", i), "COVID-19").await;
            service.continent_shares(&format!("virus-{}", i)).await;
        }

        assert_eq!(service.details.lock().await.len(), 4);
        assert_eq!(service.continents.lock().await.len(), 4);
        assert_eq!(service.generations.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_publish_clears_view_caches() {
        let service = service(source());
        service.continent_shares("COVID-19").await;
        service.country_detail("FR", "COVID-19").await;
        assert_eq!(service.details.lock().await.len(), 1);

        assert!(service.refresh().await.published);

        assert!(service.continents.lock().await.is_empty());
        assert!(service.details.lock().await.is_empty());
        assert_eq!(service.generations.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_country_detail_with_failing_population() {
        let mut source = source();
        source.failing.insert("population");
        let service = service(source);

        let detail = service.country_detail("fr", "COVID-19").await;
        assert_eq!(detail.country_code, "FR");
        assert_eq!(detail.history.len(), 2);
        assert_eq!(detail.projection.projected_next_value, 225);
        assert_eq!(detail.population, None);
    }

    #[tokio::test]
    async fn test_background_refresh_disabled() {
        let service = Arc::new(DashboardService::new(
            Arc::new(source()),
            DashboardConfig {
                refresh_interval_secs: 0,
                ..Default::default()
            },
        ));
        assert!(service.start_background_refresh().is_none());
    }
}
