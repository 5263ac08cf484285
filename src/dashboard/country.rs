//! Country drill-down

use crate::analytics::{
    merge_country_series, project, ChartRow, HistoryPoint, PredictionPoint, ProjectionResult,
    RatePoint,
};
use crate::records::RawCaseRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything shown for one country and virus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDetail {
    pub country_code: String,
    pub virus: String,
    /// Observations, ascending by day
    pub history: Vec<HistoryPoint>,
    /// Projection over the case series of `history`
    pub projection: ProjectionResult,
    pub population: Option<u64>,
    /// History joined with model outputs, ascending by day
    pub chart: Vec<ChartRow>,
}

/// Raw inputs of a drill-down, one per upstream source
#[derive(Debug, Clone, Default)]
pub struct CountryInputs {
    pub history: Vec<RawCaseRecord>,
    pub predictions: Vec<PredictionPoint>,
    pub mortality: Vec<RatePoint>,
    pub transmission: Vec<RatePoint>,
    pub population: Option<u64>,
}

impl CountryDetail {
    /// Assemble a drill-down from the fetched inputs
    ///
    /// Invalid history rows are dropped. A day reported twice keeps the
    /// later row.
    pub fn assemble(country_code: &str, virus: &str, inputs: CountryInputs) -> Self {
        let mut by_day: BTreeMap<NaiveDate, HistoryPoint> = BTreeMap::new();
        for record in inputs.history.iter().filter_map(RawCaseRecord::to_case_record) {
            by_day.insert(
                record.date,
                HistoryPoint {
                    date: record.date,
                    cases: record.total_cases,
                    deaths: record.total_deaths,
                    recovered: record.total_recovered,
                },
            );
        }
        let history: Vec<HistoryPoint> = by_day.into_values().collect();

        let series: Vec<f64> = history.iter().map(|p| p.cases as f64).collect();
        let projection = project(&series);

        let chart = merge_country_series(
            &history,
            &inputs.predictions,
            &inputs.mortality,
            &inputs.transmission,
        );

        Self {
            country_code: country_code.to_uppercase(),
            virus: virus.to_string(),
            history,
            projection,
            population: inputs.population,
            chart,
        }
    }

    /// Most recent observation, if any
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.history.last()
    }
}
