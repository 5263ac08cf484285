//! Dashboard Analytics
//!
//! Pure functions turning a [`VirusDateCountryIndex`](crate::records::VirusDateCountryIndex)
//! and the remote totals into chart-ready data.
//!
//! - [`monthly`]: per-month, per-virus totals and yearly evolution
//! - [`share`]: percentage shares and country rankings
//! - [`projection`]: two-point trend projection
//! - [`choropleth`]: case-count buckets for the world map
//! - [`series`]: date-merged country chart table

pub mod choropleth;
pub mod monthly;
pub mod projection;
pub mod series;
pub mod share;

pub use choropleth::{map_layer, ChoroplethBucket, LegendEntry, MapCell};
pub use monthly::{monthly_totals, monthly_totals_csv, yearly_evolution, MonthlyVirusTotals, YearlyTotal};
pub use projection::{project, ProjectionResult, TrendDirection};
pub use series::{merge_country_series, ChartRow, HistoryPoint, PredictionPoint, RatePoint};
pub use share::{compute_shares, continent_shares, is_unknown_label, rank_countries, round1, ShareEntry};
