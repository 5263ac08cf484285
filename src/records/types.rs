//! Case record types
//!
//! - `RawCaseRecord`: lenient wire shape of one `/suivis/` row
//! - `CaseRecord`: validated observation for one (virus, country, day)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Virus name used when a record carries no pandemic name
pub const UNKNOWN_VIRUS: &str = "Unknown";

/// A validated case observation
///
/// Cumulative totals for one virus in one country on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseRecord {
    /// ISO-3166 alpha-2 code, upper-cased
    pub country_code: String,
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Pandemic / virus name
    pub virus_name: String,
    /// Cumulative confirmed cases
    pub total_cases: u64,
    /// Cumulative deaths
    pub total_deaths: u64,
    /// Cumulative recoveries
    pub total_recovered: u64,
}

impl CaseRecord {
    /// Create a record with zero deaths and recoveries
    pub fn new(
        country_code: impl Into<String>,
        date: NaiveDate,
        virus_name: impl Into<String>,
        total_cases: u64,
    ) -> Self {
        Self {
            country_code: country_code.into().to_uppercase(),
            date,
            virus_name: virus_name.into(),
            total_cases,
            total_deaths: 0,
            total_recovered: 0,
        }
    }

    /// Builder method: set cumulative deaths
    pub fn deaths(mut self, total_deaths: u64) -> Self {
        self.total_deaths = total_deaths;
        self
    }

    /// Builder method: set cumulative recoveries
    pub fn recovered(mut self, total_recovered: u64) -> Self {
        self.total_recovered = total_recovered;
        self
    }

    /// Month key ("YYYY-MM") of this record's day
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// One row of the remote `/suivis/` payload
///
/// Every field is optional so that a single malformed row never fails
/// deserialization of the whole array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCaseRecord {
    #[serde(default)]
    pub id_suivi: Option<i64>,
    #[serde(default, rename = "pays_iso")]
    pub country_code: Option<String>,
    #[serde(default, rename = "date_jour")]
    pub date: Option<String>,
    #[serde(default, rename = "pandemie")]
    pub virus_name: Option<String>,
    #[serde(default, rename = "total_cas")]
    pub total_cases: Option<i64>,
    #[serde(default, rename = "total_mort")]
    pub total_deaths: Option<i64>,
    #[serde(default, rename = "guerison")]
    pub total_recovered: Option<i64>,
    #[serde(default, rename = "nouveau_cas")]
    pub new_cases: Option<i64>,
    #[serde(default, rename = "nouveau_mort")]
    pub new_deaths: Option<i64>,
    #[serde(default, rename = "nouvelle_guerison")]
    pub new_recovered: Option<i64>,
}

impl RawCaseRecord {
    /// Create a raw row with the fields the normalizer requires
    pub fn new(
        country_code: impl Into<String>,
        date: impl Into<String>,
        virus_name: impl Into<String>,
        total_cases: i64,
    ) -> Self {
        Self {
            country_code: Some(country_code.into()),
            date: Some(date.into()),
            virus_name: Some(virus_name.into()),
            total_cases: Some(total_cases),
            ..Default::default()
        }
    }

    /// Validate this row into a [`CaseRecord`]
    ///
    /// Returns `None` when the country code, the day or the case total is
    /// missing or unusable. A missing or blank virus name maps to
    /// [`UNKNOWN_VIRUS`]; missing deaths/recoveries count as zero.
    pub fn to_case_record(&self) -> Option<CaseRecord> {
        let country_code = self
            .country_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())?
            .to_uppercase();

        let date = parse_day(self.date.as_deref()?)?;
        let total_cases = self.total_cases.and_then(|v| u64::try_from(v).ok())?;

        let virus_name = self
            .virus_name
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_VIRUS)
            .to_string();

        Some(CaseRecord {
            country_code,
            date,
            virus_name,
            total_cases,
            total_deaths: non_negative(self.total_deaths),
            total_recovered: non_negative(self.total_recovered),
        })
    }
}

fn non_negative(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// Parse a `YYYY-MM-DD` day, tolerating a trailing time component
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let day = s.split_once('T').map(|(d, _)| d).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_raw_record_deserializes_wire_names() {
        let json = r#"{
            "id_suivi": 7,
            "pays_iso": "fr",
            "date_jour": "2020-03-01",
            "pandemie": "COVID-19",
            "total_cas": 120,
            "total_mort": 3,
            "guerison": 10,
            "nouveau_cas": 20,
            "nouveau_mort": 1,
            "nouvelle_guerison": 2,
            "id_logging": 4
        }"#;

        let raw: RawCaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(raw.country_code.as_deref(), Some("fr"));
        assert_eq!(raw.total_cases, Some(120));

        let record = raw.to_case_record().unwrap();
        assert_eq!(record.country_code, "FR");
        assert_eq!(record.date, day("2020-03-01"));
        assert_eq!(record.total_deaths, 3);
        assert_eq!(record.total_recovered, 10);
        assert_eq!(record.month(), "2020-03");
    }

    #[test]
    fn test_missing_virus_defaults_to_unknown() {
        let mut raw = RawCaseRecord::new("de", "2020-04-02", "", 5);
        assert_eq!(raw.to_case_record().unwrap().virus_name, UNKNOWN_VIRUS);

        raw.virus_name = None;
        assert_eq!(raw.to_case_record().unwrap().virus_name, UNKNOWN_VIRUS);
    }

    #[test]
    fn test_missing_required_fields_are_rejected() {
        let valid = RawCaseRecord::new("it", "2020-03-01", "COVID-19", 10);

        let no_country = RawCaseRecord {
            country_code: None,
            ..valid.clone()
        };
        assert!(no_country.to_case_record().is_none());

        let blank_country = RawCaseRecord {
            country_code: Some("  ".to_string()),
            ..valid.clone()
        };
        assert!(blank_country.to_case_record().is_none());

        let bad_date = RawCaseRecord {
            date: Some("03/01/2020".to_string()),
            ..valid.clone()
        };
        assert!(bad_date.to_case_record().is_none());

        let no_cases = RawCaseRecord {
            total_cases: None,
            ..valid.clone()
        };
        assert!(no_cases.to_case_record().is_none());

        let negative_cases = RawCaseRecord {
            total_cases: Some(-4),
            ..valid
        };
        assert!(negative_cases.to_case_record().is_none());
    }

    #[test]
    fn test_parse_day_accepts_datetime_suffix() {
        assert_eq!(parse_day("2021-12-31T00:00:00"), Some(day("2021-12-31")));
        assert_eq!(parse_day(" 2021-01-05 "), Some(day("2021-01-05")));
        assert_eq!(parse_day("2021-13-01"), None);
    }

    #[test]
    fn test_case_record_builder() {
        let record = CaseRecord::new("us", day("2020-05-01"), "COVID-19", 100)
            .deaths(4)
            .recovered(50);
        assert_eq!(record.country_code, "US");
        assert_eq!(record.total_deaths, 4);
        assert_eq!(record.total_recovered, 50);
    }
}
