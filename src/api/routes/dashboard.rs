//! Dashboard Routes
//!
//! - GET /api/v1/viruses - Known viruses and the default selection
//! - GET /api/v1/monthly - Monthly totals per virus
//! - GET /api/v1/shares/viruses - Virus shares
//! - GET /api/v1/shares/continents - Continent shares for one virus
//! - GET /api/v1/map - Choropleth layer for one virus and day
//! - GET /api/v1/evolution - Yearly evolution of one virus
//! - GET /api/v1/export/monthly - Monthly totals as CSV
//! - POST /api/v1/refresh - Rebuild the snapshot now

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analytics::{monthly_totals_csv, ChoroplethBucket, MonthlyVirusTotals, ShareEntry};
use crate::api::dto::{
    DateWindow, DayParams, EvolutionResponse, MapResponse, VirusParams, VirusesResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::dashboard::{DashboardSnapshot, DateCursor, RefreshReport};

/// GET /api/v1/viruses
pub async fn list_viruses(State(state): State<Arc<AppState>>) -> Json<VirusesResponse> {
    let snapshot = state.dashboard.snapshot().await;
    Json(VirusesResponse {
        viruses: snapshot.viruses(),
        default_virus: snapshot.default_virus.clone(),
        loaded: snapshot.loaded,
        built_at: snapshot.built_at,
    })
}

/// GET /api/v1/monthly
pub async fn monthly(State(state): State<Arc<AppState>>) -> Json<Vec<MonthlyVirusTotals>> {
    Json(state.dashboard.snapshot().await.monthly.clone())
}

/// GET /api/v1/shares/viruses
pub async fn virus_shares(State(state): State<Arc<AppState>>) -> Json<Vec<ShareEntry>> {
    Json(state.dashboard.snapshot().await.virus_shares.clone())
}

/// GET /api/v1/shares/continents?virus=
///
/// Defaults to the snapshot's default virus. Fetched on demand.
pub async fn continent_shares(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VirusParams>,
) -> ApiResult<Json<Vec<ShareEntry>>> {
    let snapshot = state.dashboard.snapshot().await;
    let virus = snapshot
        .resolve_virus(params.virus.as_deref())
        .ok_or_else(|| ApiError::Validation("No virus selected and none known".to_string()))?;

    let shares = state.dashboard.continent_shares(&virus).await;
    Ok(Json(shares.as_ref().clone()))
}

/// GET /api/v1/map?virus=&date=
pub async fn map(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DayParams>,
) -> ApiResult<Json<MapResponse>> {
    let requested = params.day()?;
    let snapshot = state.dashboard.snapshot().await;
    let virus = snapshot.resolve_virus(params.virus.as_deref());

    let (window, countries) = match selected_day(&snapshot, virus.as_deref(), requested) {
        Some((virus, cursor)) => {
            let cells = snapshot.map_layer(virus, cursor.current());
            (Some(window(&cursor)), cells)
        }
        None => (None, BTreeMap::new()),
    };

    Ok(Json(MapResponse {
        virus,
        window,
        legend: ChoroplethBucket::legend(),
        countries,
    }))
}

/// GET /api/v1/evolution?virus=
pub async fn evolution(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VirusParams>,
) -> Json<EvolutionResponse> {
    let snapshot = state.dashboard.snapshot().await;
    let virus = snapshot.resolve_virus(params.virus.as_deref());
    let years = virus
        .as_deref()
        .map(|v| snapshot.evolution(v))
        .unwrap_or_default();

    Json(EvolutionResponse { virus, years })
}

/// GET /api/v1/export/monthly
pub async fn export_monthly(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let snapshot = state.dashboard.snapshot().await;
    let body = monthly_totals_csv(&snapshot.monthly)
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"monthly_totals.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshReport> {
    Json(state.dashboard.refresh().await)
}

/// Virus and cursor for a day-scoped view, when the virus has data
pub(crate) fn selected_day<'a>(
    snapshot: &DashboardSnapshot,
    virus: Option<&'a str>,
    requested: Option<chrono::NaiveDate>,
) -> Option<(&'a str, DateCursor)> {
    let virus = virus?;
    let cursor = snapshot.date_cursor(virus, requested)?;
    Some((virus, cursor))
}

pub(crate) fn window(cursor: &DateCursor) -> DateWindow {
    DateWindow {
        date: cursor.current(),
        first: cursor.first(),
        last: cursor.last(),
        previous: cursor.previous(),
        next: cursor.next(),
    }
}
