//! Country chart table
//!
//! Joins a country's historical observations with the model outputs
//! (predicted cases, mortality and transmission rates) into one row per
//! day, ascending.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Historical observation for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Predicted case count for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub predicted: f64,
}

/// A daily rate (mortality or transmission)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

/// One day of the merged country chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortality_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_rate: Option<f64>,
}

impl ChartRow {
    /// Row for `date` with every series missing
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            cases: None,
            deaths: None,
            recovered: None,
            predicted: None,
            mortality_rate: None,
            transmission_rate: None,
        }
    }
}

/// Outer-join the four series by day
///
/// A later point for a day already seen in the same series replaces the
/// earlier one.
pub fn merge_country_series(
    history: &[HistoryPoint],
    predictions: &[PredictionPoint],
    mortality: &[RatePoint],
    transmission: &[RatePoint],
) -> Vec<ChartRow> {
    let mut table: BTreeMap<NaiveDate, ChartRow> = BTreeMap::new();

    fn row(table: &mut BTreeMap<NaiveDate, ChartRow>, date: NaiveDate) -> &mut ChartRow {
        table.entry(date).or_insert_with(|| ChartRow::empty(date))
    }

    for point in history {
        let r = row(&mut table, point.date);
        r.cases = Some(point.cases);
        r.deaths = Some(point.deaths);
        r.recovered = Some(point.recovered);
    }

    for point in predictions {
        row(&mut table, point.date).predicted = Some(point.predicted);
    }

    for point in mortality {
        row(&mut table, point.date).mortality_rate = Some(point.rate);
    }

    for point in transmission {
        row(&mut table, point.date).transmission_rate = Some(point.rate);
    }

    table.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    #[test]
    fn test_merge_outer_joins_by_day() {
        let history = vec![
            HistoryPoint { date: day(2), cases: 20, deaths: 1, recovered: 3 },
            HistoryPoint { date: day(1), cases: 10, deaths: 0, recovered: 1 },
        ];
        let predictions = vec![
            PredictionPoint { date: day(2), predicted: 21.5 },
            PredictionPoint { date: day(3), predicted: 30.0 },
        ];
        let mortality = vec![RatePoint { date: day(1), rate: 0.02 }];
        let transmission = vec![RatePoint { date: day(4), rate: 1.3 }];

        let rows = merge_country_series(&history, &predictions, &mortality, &transmission);
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3), day(4)]);

        assert_eq!(rows[0].cases, Some(10));
        assert_eq!(rows[0].mortality_rate, Some(0.02));
        assert_eq!(rows[0].predicted, None);

        assert_eq!(rows[1].cases, Some(20));
        assert_eq!(rows[1].predicted, Some(21.5));

        assert_eq!(rows[2].cases, None);
        assert_eq!(rows[2].predicted, Some(30.0));

        assert_eq!(rows[3].transmission_rate, Some(1.3));
    }

    #[test]
    fn test_merge_empty_inputs() {
        assert!(merge_country_series(&[], &[], &[], &[]).is_empty());
    }

    #[test]
    fn test_chart_row_omits_missing_series() {
        let rows = merge_country_series(
            &[],
            &[PredictionPoint { date: day(5), predicted: 4.0 }],
            &[],
            &[],
        );
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["date"], "2020-03-05");
        assert_eq!(json["predicted"], 4.0);
        assert!(json.get("cases").is_none());
    }
}
