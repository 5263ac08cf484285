//! Dashboard
//!
//! Ties the remote source to the aggregation core.
//!
//! ## Architecture
//!
//! - **DashboardSnapshot**: immutable derived views from one fetch round
//! - **DashboardService**: fetch fan-out, snapshot publication, on-demand views
//! - **GenerationTracker**: per-resource request counters that discard stale responses
//! - **CountryDetail**: per-country history, projection and merged chart

mod cache;
mod country;
mod generation;
mod selection;
mod service;
mod snapshot;

pub use cache::ViewCache;
pub use country::{CountryDetail, CountryInputs};
pub use generation::{GenerationTracker, ResourceKey, Ticket};
pub use selection::{default_virus, DateCursor};
pub use service::{DashboardConfig, DashboardService, RefreshReport};
pub use snapshot::DashboardSnapshot;
