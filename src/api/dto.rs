//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::analytics::{LegendEntry, MapCell, YearlyTotal};
use crate::api::error::ApiError;
use crate::records::parse_day;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// QUERY PARAMETERS
// ============================================

/// `?virus=`
#[derive(Debug, Default, Deserialize)]
pub struct VirusParams {
    #[serde(default)]
    pub virus: Option<String>,
}

/// `?virus=&date=&search=`
#[derive(Debug, Default, Deserialize)]
pub struct DayParams {
    #[serde(default)]
    pub virus: Option<String>,
    /// `YYYY-MM-DD`; unknown days fall back to the first known day
    #[serde(default)]
    pub date: Option<String>,
    /// Case-insensitive filter on country code or name
    #[serde(default)]
    pub search: Option<String>,
}

impl DayParams {
    /// Parsed `date`, rejecting malformed values
    pub fn day(&self) -> Result<Option<NaiveDate>, ApiError> {
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => Ok(None),
            Some(raw) => parse_day(raw)
                .map(Some)
                .ok_or_else(|| ApiError::Validation(format!("Invalid date: {}", raw))),
        }
    }
}

// ============================================
// DASHBOARD RESPONSES
// ============================================

/// Known viruses
#[derive(Debug, Serialize)]
pub struct VirusesResponse {
    pub viruses: Vec<String>,
    pub default_virus: Option<String>,
    /// False until the first snapshot has been published
    pub loaded: bool,
    pub built_at: DateTime<Utc>,
}

/// Bounds and neighbours of the selected day
#[derive(Debug, Serialize)]
pub struct DateWindow {
    pub date: NaiveDate,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub previous: Option<NaiveDate>,
    pub next: Option<NaiveDate>,
}

/// World map layer for one virus and day
#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub virus: Option<String>,
    pub window: Option<DateWindow>,
    pub legend: Vec<LegendEntry>,
    pub countries: BTreeMap<String, MapCell>,
}

/// One row of the country ranking
#[derive(Debug, Serialize)]
pub struct RankedCountry {
    pub code: String,
    pub name: Option<String>,
    pub cases: u64,
    pub percent_of_total: f64,
}

/// Country ranking for one virus and day
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub virus: Option<String>,
    pub window: Option<DateWindow>,
    pub countries: Vec<RankedCountry>,
}

/// Yearly evolution of one virus
#[derive(Debug, Serialize)]
pub struct EvolutionResponse {
    pub virus: Option<String>,
    pub years: Vec<YearlyTotal>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "loading"
    pub status: String,
    pub snapshot_generation: u64,
    pub snapshot_records: usize,
    pub snapshot_built_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
}

// ============================================
// CONSOLE DTOs
// ============================================

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}
