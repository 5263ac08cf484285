//! Wire DTOs for the remote pandemic API
//!
//! Field names follow the upstream JSON; Rust names are mapped with
//! `serde(rename)`.

use crate::analytics::{PredictionPoint, RatePoint};
use crate::records::parse_day;
use serde::{Deserialize, Serialize};

/// Latest totals for one virus (`/suivis/last-per-virus`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VirusTotal {
    #[serde(default)]
    pub virus: Option<String>,
    #[serde(default, rename = "total_cas")]
    pub total_cases: Option<i64>,
    #[serde(default, rename = "total_mort")]
    pub total_deaths: Option<i64>,
    #[serde(default, rename = "guerison")]
    pub total_recovered: Option<i64>,
}

/// Latest totals for one continent (`/suivis/last-per-continent`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContinentTotal {
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default, rename = "pandemie")]
    pub pandemic: Option<String>,
    #[serde(default, rename = "total_cas")]
    pub total_cases: Option<i64>,
    #[serde(default, rename = "total_mort")]
    pub total_deaths: Option<i64>,
}

/// Model prediction row (`/predict/{virus}/{iso}`)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PredictionDto {
    pub date: String,
    #[serde(default)]
    pub predit: serde_json::Value,
}

/// Rate row (`/predict/mortalite|transmission/{virus}/{iso}`)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RateDto {
    pub date: String,
    #[serde(default)]
    pub taux: serde_json::Value,
}

/// Country metadata row; only the population is used
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountryMetadataDto {
    #[serde(default)]
    pub population: Option<u64>,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Read a JSON number or numeric string; anything else is zero
pub(crate) fn lenient_number(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl PredictionDto {
    pub(crate) fn into_point(self) -> Option<PredictionPoint> {
        Some(PredictionPoint {
            date: parse_day(&self.date)?,
            predicted: lenient_number(&self.predit),
        })
    }
}

impl RateDto {
    pub(crate) fn into_point(self) -> Option<RatePoint> {
        Some(RatePoint {
            date: parse_day(&self.date)?,
            rate: lenient_number(&self.taux),
        })
    }
}

impl VirusTotal {
    /// Label and value for the share calculator
    pub fn share_item(&self) -> (String, f64) {
        (
            self.virus
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| crate::records::UNKNOWN_VIRUS.to_string()),
            self.total_cases.unwrap_or(0).max(0) as f64,
        )
    }
}

impl ContinentTotal {
    /// Label and value for the share calculator
    pub fn share_item(&self) -> (String, f64) {
        (
            self.continent.clone().unwrap_or_default(),
            self.total_cases.unwrap_or(0).max(0) as f64,
        )
    }
}
