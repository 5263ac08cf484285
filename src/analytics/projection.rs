//! Trend Projector
//!
//! Naive one-step-ahead extrapolation from the two most recent points of
//! a chronological series. Not a statistical forecast.

use serde::{Deserialize, Serialize};

/// Direction of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increase,
    Decrease,
    Stable,
}

impl TrendDirection {
    /// Classify a signed change
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            TrendDirection::Increase
        } else if change < 0.0 {
            TrendDirection::Decrease
        } else {
            TrendDirection::Stable
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increase => write!(f, "increase"),
            TrendDirection::Decrease => write!(f, "decrease"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Result of a two-point projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub last_value: f64,
    /// `(last - previous) / previous`, zero when `previous` is zero
    pub growth_rate: f64,
    pub projected_next_value: i64,
    pub trend_direction: TrendDirection,
}

impl ProjectionResult {
    /// Projection of a series too short to extrapolate
    pub fn flat() -> Self {
        Self {
            last_value: 0.0,
            growth_rate: 0.0,
            projected_next_value: 0,
            trend_direction: TrendDirection::Stable,
        }
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::flat()
    }
}

/// Project the next value of a chronological series
///
/// Only the last two points are used. Fewer than two points yields
/// [`ProjectionResult::flat`].
pub fn project(series: &[f64]) -> ProjectionResult {
    let [.., previous, last] = series else {
        return ProjectionResult::flat();
    };
    let (previous, last) = (*previous, *last);

    let growth_rate = if previous == 0.0 {
        0.0
    } else {
        (last - previous) / previous
    };

    ProjectionResult {
        last_value: last,
        growth_rate,
        projected_next_value: (last * (1.0 + growth_rate)).round() as i64,
        trend_direction: TrendDirection::from_change(growth_rate),
    }
}
