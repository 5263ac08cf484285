//! # epiwatch
//!
//! Pandemic dashboard backend: pulls case records and reference data from
//! a remote pandemic API and turns them into chart-ready views.
//!
//! ## Features
//!
//! - **Normalization**: raw case rows folded into a `virus → day → country` index
//! - **Aggregation**: monthly totals, yearly evolution, shares and rankings
//! - **Projection**: naive two-point trend for a country's case series
//! - **Consistency**: immutable snapshots and per-resource request generations
//!
//! ## Modules
//!
//! - [`records`]: case records and the Record Normalizer
//! - [`analytics`]: aggregation, shares, projection, map buckets
//! - [`remote`]: HTTP client for the pandemic API
//! - [`dashboard`]: snapshots and the dashboard service
//! - [`session`]: stored login token
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use epiwatch::dashboard::{DashboardConfig, DashboardService};
//! use epiwatch::remote::{ApiClient, RemoteConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(ApiClient::new(RemoteConfig::default())?);
//!     let dashboard = DashboardService::new(client, DashboardConfig::default());
//!
//!     dashboard.refresh().await;
//!     let snapshot = dashboard.snapshot().await;
//!
//!     for month in &snapshot.monthly {
//!         println!("{}: {:?}", month.month, month.per_virus_total);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod records;
pub mod remote;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use records::{normalize, CaseRecord, RawCaseRecord, VirusDateCountryIndex};

pub use analytics::{
    compute_shares, monthly_totals, project, MonthlyVirusTotals, ProjectionResult, ShareEntry,
    TrendDirection,
};

pub use dashboard::{DashboardConfig, DashboardService, DashboardSnapshot};

pub use remote::{ApiClient, PandemicSource, ReferenceConsole, RemoteConfig, RemoteError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{generate_default_config, Config, ConfigError, ConfigLoad, LoggingConfig};

pub use session::{Session, SessionError, SessionStore};
