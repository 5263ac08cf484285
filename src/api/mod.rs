//! epiwatch REST API
//!
//! HTTP API layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /api/v1/viruses` - Known viruses and default selection
//! - `GET /api/v1/monthly` - Monthly totals per virus
//! - `GET /api/v1/shares/viruses` - Virus shares
//! - `GET /api/v1/shares/continents?virus=` - Continent shares
//! - `GET /api/v1/map?virus=&date=` - Choropleth layer
//! - `GET /api/v1/evolution?virus=` - Yearly evolution
//! - `GET /api/v1/export/monthly` - Monthly totals as CSV
//! - `POST /api/v1/refresh` - Rebuild the snapshot
//!
//! ## Countries
//! - `GET /api/v1/countries?virus=&date=&search=` - Country ranking
//! - `GET /api/v1/countries/:code?virus=` - Country drill-down
//!
//! ## Reference console
//! - `GET /api/v1/reference/:kind` - List a collection
//! - `POST /api/v1/reference/:kind` - Create a record (Bearer token)
//! - `POST /api/v1/login` - Obtain a token
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Dashboard routes
        .route("/viruses", get(routes::dashboard::list_viruses))
        .route("/monthly", get(routes::dashboard::monthly))
        .route("/shares/viruses", get(routes::dashboard::virus_shares))
        .route("/shares/continents", get(routes::dashboard::continent_shares))
        .route("/map", get(routes::dashboard::map))
        .route("/evolution", get(routes::dashboard::evolution))
        .route("/export/monthly", get(routes::dashboard::export_monthly))
        .route("/refresh", post(routes::dashboard::refresh))
        // Country routes
        .route("/countries", get(routes::countries::ranking))
        .route("/countries/:code", get(routes::countries::detail))
        // Reference console routes
        .route(
            "/reference/:kind",
            get(routes::reference::list).post(routes::reference::create),
        )
        .route("/login", post(routes::reference::login));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("epiwatch API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("epiwatch API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardConfig, DashboardService};
    use crate::records::RawCaseRecord;
    use crate::remote::{ContinentTotal, Country, VirusTotal};
    use crate::testing::{FakeConsole, FakeSource, FAKE_TOKEN};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn fake_source() -> FakeSource {
        FakeSource {
            records: vec![
                RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 120),
                RawCaseRecord::new("FR", "2020-03-15", "COVID-19", 130),
                RawCaseRecord::new("DE", "2020-03-15", "COVID-19", 20_000),
                RawCaseRecord::new("BR", "2016-02-01", "Zika", 7),
            ],
            virus_totals: vec![
                VirusTotal {
                    virus: Some("COVID-19".into()),
                    total_cases: Some(900),
                    ..Default::default()
                },
                VirusTotal {
                    virus: Some("Zika".into()),
                    total_cases: Some(100),
                    ..Default::default()
                },
            ],
            continents: vec![ContinentTotal {
                continent: Some("Europe".into()),
                total_cases: Some(20_130),
                ..Default::default()
            }],
            countries: vec![Country {
                id: 1,
                continent_id: 1,
                name: "Allemagne".into(),
                alpha2: "DE".into(),
                numeric: "276".into(),
                alpha3: "DEU".into(),
            }],
            history: vec![
                RawCaseRecord::new("FR", "2020-03-01", "COVID-19", 100),
                RawCaseRecord::new("FR", "2020-03-02", "COVID-19", 150),
            ],
            ..Default::default()
        }
    }

    async fn create_test_app(refresh: bool) -> Router {
        let dashboard = Arc::new(DashboardService::new(
            Arc::new(fake_source()),
            DashboardConfig::default(),
        ));
        if refresh {
            dashboard.refresh().await;
        }
        let state = AppState::new(dashboard, Arc::new(FakeConsole), ApiConfig::default());
        build_router(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app(false).await;
        let (status, _) = get_json(app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_waits_for_snapshot() {
        let app = create_test_app(false).await;
        let (status, _) = get_json(app, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let app = create_test_app(true).await;
        let (status, _) = get_json(app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app(true).await;
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["snapshot_records"], 4);
    }

    #[tokio::test]
    async fn test_viruses_and_monthly() {
        let app = create_test_app(true).await;
        let (_, body) = get_json(app.clone(), "/api/v1/viruses").await;
        assert_eq!(body["default_virus"], "COVID-19");
        assert_eq!(body["viruses"].as_array().unwrap().len(), 2);

        let (status, body) = get_json(app, "/api/v1/monthly").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["month"], "2016-02");
        assert_eq!(body[1]["per_virus_total"]["COVID-19"], 20_250);
    }

    #[tokio::test]
    async fn test_map_clamps_unknown_date() {
        let app = create_test_app(true).await;
        let (status, body) = get_json(app, "/api/v1/map?virus=COVID-19&date=2020-03-10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["window"]["date"], "2020-03-01");
        assert_eq!(body["window"]["next"], "2020-03-15");
        assert_eq!(body["countries"]["FR"]["bucket"], "low");
        assert_eq!(body["legend"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_map_rejects_bad_date() {
        let app = create_test_app(true).await;
        let (status, body) = get_json(app, "/api/v1/map?date=15-03-2020").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_country_ranking_with_search() {
        let app = create_test_app(true).await;
        let (_, body) = get_json(app.clone(), "/api/v1/countries?date=2020-03-15").await;
        let countries = body["countries"].as_array().unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0]["code"], "DE");
        assert_eq!(countries[0]["name"], "Allemagne");

        let (_, body) = get_json(app, "/api/v1/countries?date=2020-03-15&search=fr").await;
        assert_eq!(body["countries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_country_detail() {
        let app = create_test_app(true).await;
        let (status, body) = get_json(app.clone(), "/api/v1/countries/fr").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["country_code"], "FR");
        assert_eq!(body["projection"]["projected_next_value"], 225);
        assert_eq!(body["projection"]["trend_direction"], "increase");

        let (status, _) = get_json(app.clone(), "/api/v1/countries/f1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/api/v1/countries/abcdefgh").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_continent_shares() {
        let app = create_test_app(true).await;
        let (_, body) = get_json(app, "/api/v1/shares/continents").await;
        assert_eq!(body[0]["label"], "Europe");
        assert_eq!(body[0]["percent_of_total"], 100.0);
    }

    #[tokio::test]
    async fn test_export_monthly_csv() {
        let app = create_test_app(true).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/export/monthly")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["content-type"], "text/csv");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("month,COVID-19,Zika"));
    }

    #[tokio::test]
    async fn test_refresh_route() {
        let app = create_test_app(false).await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reference_list_and_unknown_kind() {
        let app = create_test_app(false).await;
        let (status, body) = get_json(app.clone(), "/api/v1/reference/continents").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["nom_continent"], "Europe");

        let (status, _) = get_json(app, "/api/v1/reference/planets").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn create_request(token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/reference/continents")
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_reference_create() {
        let app = create_test_app(false).await;

        let response = app
            .clone()
            .oneshot(create_request(None, r#"{"nom_continent": "Océanie"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(create_request(Some(FAKE_TOKEN), r#"{"nom_continent": "  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(create_request(Some("expired"), r#"{"nom_continent": "Océanie"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(create_request(Some(FAKE_TOKEN), r#"{"nom_continent": "Océanie"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_login() {
        let app = create_test_app(false).await;

        let login = |body: &'static str| {
            Request::builder()
                .method("POST")
                .uri("/api/v1/login")
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(login(r#"{"username": "admin", "password": "secret"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["access_token"], FAKE_TOKEN);

        let response = app
            .oneshot(login(r#"{"username": "admin", "password": "nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }
}
