//! Choropleth buckets for the world map
//!
//! Countries are colored by cumulative cases on the selected day.

use crate::records::VirusDateCountryIndex;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Case-count class of a country on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoroplethBucket {
    /// No reported cases
    NoCases,
    /// 1 to 1 000
    Low,
    /// 1 001 to 10 000
    Moderate,
    /// 10 001 to 100 000
    High,
    /// 100 001 to 500 000
    VeryHigh,
    /// More than 500 000
    Severe,
}

impl ChoroplethBucket {
    /// Classify a case count
    pub fn for_cases(cases: u64) -> Self {
        match cases {
            c if c > 500_000 => ChoroplethBucket::Severe,
            c if c > 100_000 => ChoroplethBucket::VeryHigh,
            c if c > 10_000 => ChoroplethBucket::High,
            c if c > 1_000 => ChoroplethBucket::Moderate,
            c if c > 0 => ChoroplethBucket::Low,
            _ => ChoroplethBucket::NoCases,
        }
    }

    /// Fill color
    pub fn color(&self) -> &'static str {
        match self {
            ChoroplethBucket::Severe => "#800026",
            ChoroplethBucket::VeryHigh => "#BD0026",
            ChoroplethBucket::High => "#E31A1C",
            ChoroplethBucket::Moderate => "#FC4E2A",
            ChoroplethBucket::Low => "#FD8D3C",
            ChoroplethBucket::NoCases => "#D3D3D3",
        }
    }

    /// Legend rows, lowest class first
    pub fn legend() -> Vec<LegendEntry> {
        const GRADES: [u64; 5] = [0, 1_000, 10_000, 100_000, 500_000];

        GRADES
            .iter()
            .enumerate()
            .map(|(i, &grade)| {
                let label = match GRADES.get(i + 1) {
                    Some(next) => format!("{} - {}", grade, next),
                    None => format!("> {}", grade),
                };
                // Legend swatches use the color of the grade's lower bound
                let bucket = ChoroplethBucket::for_cases(grade);
                LegendEntry {
                    label,
                    color: bucket.color(),
                }
            })
            .collect()
    }
}

/// One legend row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
}

/// Map cell for one country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCell {
    pub cases: u64,
    pub bucket: ChoroplethBucket,
    pub color: &'static str,
}

/// Classify every country reported for a virus on a day
///
/// Countries absent from the day are not listed; renderers color them
/// as [`ChoroplethBucket::NoCases`].
pub fn map_layer(
    index: &VirusDateCountryIndex,
    virus: &str,
    date: NaiveDate,
) -> BTreeMap<String, MapCell> {
    index
        .cases_on(virus, date)
        .map(|countries| {
            countries
                .iter()
                .map(|(code, &cases)| {
                    let bucket = ChoroplethBucket::for_cases(cases);
                    (
                        code.clone(),
                        MapCell {
                            cases,
                            bucket,
                            color: bucket.color(),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}
