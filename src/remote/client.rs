//! Remote API Client
//!
//! HTTP client for the pandemic API and the country metadata service.

use super::dto::{
    ContinentTotal, CountryMetadataDto, LoginRequest, PredictionDto, RateDto, TokenResponse,
    VirusTotal,
};
use super::reference::{NewReferenceItem, ReferenceItem, ReferenceKind};
use crate::analytics::{PredictionPoint, RatePoint};
use crate::records::RawCaseRecord;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// HTTP client for the remote pandemic API
pub struct ApiClient {
    client: Client,
    config: RemoteConfig,
}

/// Configuration for the remote API client
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the pandemic API (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Base URL of the country metadata service
    pub population_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            population_url: "https://restcountries.com/v3.1".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Absolute URL for a path on the pandemic API
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check if the pandemic API answers
    pub async fn health_check(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RemoteError::Unavailable)
        }
    }

    /// All case records (`/suivis/`)
    pub async fn fetch_case_records(&self) -> Result<Vec<RawCaseRecord>, RemoteError> {
        self.get_json(self.client.get(self.url("/suivis/"))).await
    }

    /// Latest totals per virus
    pub async fn fetch_virus_totals(&self) -> Result<Vec<VirusTotal>, RemoteError> {
        self.get_json(self.client.get(self.url("/suivis/last-per-virus")))
            .await
    }

    /// Latest totals per continent for one pandemic
    pub async fn fetch_continent_totals(
        &self,
        pandemic: &str,
    ) -> Result<Vec<ContinentTotal>, RemoteError> {
        let request = self
            .client
            .get(self.url("/suivis/last-per-continent"))
            .query(&[("pandemie", pandemic)]);
        self.get_json(request).await
    }

    /// Full history of one country for one pandemic
    pub async fn fetch_country_history(
        &self,
        country_code: &str,
        pandemic: &str,
    ) -> Result<Vec<RawCaseRecord>, RemoteError> {
        let url = self.url(&format!(
            "/suivis/pays/{}",
            urlencoding::encode(&country_code.to_uppercase())
        ));
        let request = self.client.get(url).query(&[("pandemie", pandemic)]);
        self.get_json(request).await
    }

    /// Model predictions for one country
    pub async fn fetch_predictions(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<PredictionPoint>, RemoteError> {
        let url = self.url(&format!(
            "/predict/{}/{}",
            urlencoding::encode(pandemic),
            urlencoding::encode(&country_code.to_lowercase())
        ));
        let rows: Vec<PredictionDto> = self.get_json(self.client.get(url)).await?;
        Ok(rows.into_iter().filter_map(PredictionDto::into_point).collect())
    }

    /// Mortality or transmission rates for one country
    pub async fn fetch_rates(
        &self,
        series: &str,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError> {
        let url = self.url(&format!(
            "/predict/{}/{}/{}",
            series,
            urlencoding::encode(pandemic),
            urlencoding::encode(&country_code.to_lowercase())
        ));
        let rows: Vec<RateDto> = self.get_json(self.client.get(url)).await?;
        Ok(rows.into_iter().filter_map(RateDto::into_point).collect())
    }

    /// Population from the country metadata service
    pub async fn fetch_population(&self, country_code: &str) -> Result<Option<u64>, RemoteError> {
        let url = format!(
            "{}/alpha/{}",
            self.config.population_url.trim_end_matches('/'),
            urlencoding::encode(country_code)
        );
        let rows: Vec<CountryMetadataDto> = self.get_json(self.client.get(url)).await?;
        Ok(rows.first().and_then(|r| r.population))
    }

    /// List one reference collection
    pub async fn list_reference(
        &self,
        kind: ReferenceKind,
    ) -> Result<Vec<ReferenceItem>, RemoteError> {
        let request = self.client.get(self.url(kind.path()));

        Ok(match kind {
            ReferenceKind::Continents => self
                .get_json::<Vec<_>>(request)
                .await?
                .into_iter()
                .map(ReferenceItem::Continent)
                .collect(),
            ReferenceKind::Countries => self
                .get_json::<Vec<_>>(request)
                .await?
                .into_iter()
                .map(ReferenceItem::Country)
                .collect(),
            ReferenceKind::Families => self
                .get_json::<Vec<_>>(request)
                .await?
                .into_iter()
                .map(ReferenceItem::Family)
                .collect(),
            ReferenceKind::Viruses => self
                .get_json::<Vec<_>>(request)
                .await?
                .into_iter()
                .map(ReferenceItem::Virus)
                .collect(),
            ReferenceKind::Pandemics => self
                .get_json::<Vec<_>>(request)
                .await?
                .into_iter()
                .map(ReferenceItem::Pandemic)
                .collect(),
        })
    }

    /// Create one reference record with a bearer token
    pub async fn create_reference(
        &self,
        token: &str,
        item: &NewReferenceItem,
    ) -> Result<ReferenceItem, RemoteError> {
        let request = self
            .client
            .post(self.url(item.kind().path()))
            .bearer_auth(token);

        Ok(match item {
            NewReferenceItem::Continent(body) => {
                ReferenceItem::Continent(self.send_json(request, body).await?)
            }
            NewReferenceItem::Country(body) => {
                ReferenceItem::Country(self.send_json(request, body).await?)
            }
            NewReferenceItem::Family(body) => {
                ReferenceItem::Family(self.send_json(request, body).await?)
            }
            NewReferenceItem::Virus(body) => {
                ReferenceItem::Virus(self.send_json(request, body).await?)
            }
            NewReferenceItem::Pandemic(body) => {
                ReferenceItem::Pandemic(self.send_json(request, body).await?)
            }
        })
    }

    /// Exchange credentials for an access token
    ///
    /// Upstream answers a bad login with 400; both 400 and 401 map to
    /// [`RemoteError::Unauthorized`].
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, RemoteError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.url("/login"));

        match self.send_json(request, &body).await {
            Err(RemoteError::ApiError { status: 400, .. }) => Err(RemoteError::Unauthorized),
            other => other,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(classify)?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        body: &B,
    ) -> Result<T, RemoteError> {
        let response = request.json(body).send().await.map_err(classify)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await.map_err(classify)?;
        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(RemoteError::Unauthorized)
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(RemoteError::ApiError {
            status: status.as_u16(),
            message: text,
        })
    }
}

fn classify(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_connect() {
        RemoteError::Unavailable
    } else {
        RemoteError::Request(e)
    }
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the remote services
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Request timeout")]
    Timeout,

    #[error("Unexpected response body: {0}")]
    Decode(String),
}
