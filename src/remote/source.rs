//! Source traits
//!
//! The dashboard and the API layer depend on these traits rather than on
//! [`ApiClient`] directly, so tests can substitute in-memory sources.

use super::client::{ApiClient, RemoteError};
use super::dto::{ContinentTotal, TokenResponse, VirusTotal};
use super::reference::{Country, NewReferenceItem, ReferenceItem, ReferenceKind};
use crate::analytics::{PredictionPoint, RatePoint};
use crate::records::RawCaseRecord;
use async_trait::async_trait;

/// Read side of the remote pandemic API
#[async_trait]
pub trait PandemicSource: Send + Sync {
    /// Every case record
    async fn case_records(&self) -> Result<Vec<RawCaseRecord>, RemoteError>;

    /// Latest totals per virus
    async fn virus_totals(&self) -> Result<Vec<VirusTotal>, RemoteError>;

    /// Latest totals per continent for one pandemic
    async fn continent_totals(&self, pandemic: &str) -> Result<Vec<ContinentTotal>, RemoteError>;

    /// Country reference list (used for display names)
    async fn countries(&self) -> Result<Vec<Country>, RemoteError>;

    /// History of one country for one pandemic
    async fn country_history(
        &self,
        country_code: &str,
        pandemic: &str,
    ) -> Result<Vec<RawCaseRecord>, RemoteError>;

    /// Model predictions for one country
    async fn predictions(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<PredictionPoint>, RemoteError>;

    /// Mortality rate series for one country
    async fn mortality_rates(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError>;

    /// Transmission rate series for one country
    async fn transmission_rates(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError>;

    /// Population of one country, if the metadata service knows it
    async fn population(&self, country_code: &str) -> Result<Option<u64>, RemoteError>;
}

/// Reference-data console
#[async_trait]
pub trait ReferenceConsole: Send + Sync {
    /// List one reference collection
    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, RemoteError>;

    /// Create one reference record
    async fn create(
        &self,
        token: &str,
        item: &NewReferenceItem,
    ) -> Result<ReferenceItem, RemoteError>;

    /// Exchange credentials for a token
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, RemoteError>;
}

#[async_trait]
impl PandemicSource for ApiClient {
    async fn case_records(&self) -> Result<Vec<RawCaseRecord>, RemoteError> {
        self.fetch_case_records().await
    }

    async fn virus_totals(&self) -> Result<Vec<VirusTotal>, RemoteError> {
        self.fetch_virus_totals().await
    }

    async fn continent_totals(&self, pandemic: &str) -> Result<Vec<ContinentTotal>, RemoteError> {
        self.fetch_continent_totals(pandemic).await
    }

    async fn countries(&self) -> Result<Vec<Country>, RemoteError> {
        let items = self.list_reference(ReferenceKind::Countries).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                ReferenceItem::Country(c) => Some(c),
                _ => None,
            })
            .collect())
    }

    async fn country_history(
        &self,
        country_code: &str,
        pandemic: &str,
    ) -> Result<Vec<RawCaseRecord>, RemoteError> {
        self.fetch_country_history(country_code, pandemic).await
    }

    async fn predictions(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<PredictionPoint>, RemoteError> {
        self.fetch_predictions(pandemic, country_code).await
    }

    async fn mortality_rates(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError> {
        self.fetch_rates("mortalite", pandemic, country_code).await
    }

    async fn transmission_rates(
        &self,
        pandemic: &str,
        country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError> {
        self.fetch_rates("transmission", pandemic, country_code).await
    }

    async fn population(&self, country_code: &str) -> Result<Option<u64>, RemoteError> {
        self.fetch_population(country_code).await
    }
}

#[async_trait]
impl ReferenceConsole for ApiClient {
    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, RemoteError> {
        self.list_reference(kind).await
    }

    async fn create(
        &self,
        token: &str,
        item: &NewReferenceItem,
    ) -> Result<ReferenceItem, RemoteError> {
        self.create_reference(token, item).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, RemoteError> {
        ApiClient::login(self, username, password).await
    }
}
