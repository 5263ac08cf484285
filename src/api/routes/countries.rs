//! Country Routes
//!
//! - GET /api/v1/countries - Country ranking for one virus and day
//! - GET /api/v1/countries/:code - Drill-down for one country

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DayParams, RankedCountry, RankingResponse, VirusParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::dashboard::{selected_day, window};
use crate::api::state::AppState;
use crate::dashboard::CountryDetail;

/// GET /api/v1/countries?virus=&date=&search=
pub async fn ranking(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DayParams>,
) -> ApiResult<Json<RankingResponse>> {
    let requested = params.day()?;
    let snapshot = state.dashboard.snapshot().await;
    let virus = snapshot.resolve_virus(params.virus.as_deref());

    let (window, countries) = match selected_day(&snapshot, virus.as_deref(), requested) {
        Some((virus, cursor)) => {
            let rows = snapshot
                .country_ranking(virus, cursor.current(), params.search.as_deref())
                .into_iter()
                .map(|entry| RankedCountry {
                    name: snapshot.country_name(&entry.label).map(str::to_string),
                    cases: entry.value as u64,
                    percent_of_total: entry.percent_of_total,
                    code: entry.label,
                })
                .collect();
            (Some(window(&cursor)), rows)
        }
        None => (None, Vec::new()),
    };

    Ok(Json(RankingResponse {
        virus,
        window,
        countries,
    }))
}

/// GET /api/v1/countries/:code?virus=
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(params): Query<VirusParams>,
) -> ApiResult<Json<CountryDetail>> {
    // ISO 3166 alpha-2 or alpha-3
    let code = code.trim();
    if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::Validation(format!("Invalid country code: {}", code)));
    }

    let snapshot = state.dashboard.snapshot().await;
    let virus = snapshot
        .resolve_virus(params.virus.as_deref())
        .ok_or_else(|| ApiError::Validation("No virus selected and none known".to_string()))?;

    let detail = state.dashboard.country_detail(code, &virus).await;
    Ok(Json(detail.as_ref().clone()))
}
