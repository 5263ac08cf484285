//! In-memory stand-ins for the remote API used by unit tests

use crate::analytics::{PredictionPoint, RatePoint};
use crate::records::RawCaseRecord;
use crate::remote::{
    Continent, ContinentTotal, Country, NewReferenceItem, PandemicSource, ReferenceConsole,
    ReferenceItem, ReferenceKind, RemoteError, TokenResponse, VirusTotal,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Canned pandemic source
///
/// Endpoints named in `failing` return [`RemoteError::Unavailable`].
/// Endpoints named in `slow_first` answer their first call late and
/// empty, which lets tests overtake that call with a second one.
/// `delays_ms[endpoint][n]` delays the n-th call (0-based) and the
/// `*_rounds` vectors, when set, give the n-th call its own answer.
#[derive(Default)]
pub(crate) struct FakeSource {
    pub records: Vec<RawCaseRecord>,
    pub virus_totals: Vec<VirusTotal>,
    pub continents: Vec<ContinentTotal>,
    pub countries: Vec<Country>,
    pub history: Vec<RawCaseRecord>,
    pub predictions: Vec<PredictionPoint>,
    pub mortality: Vec<RatePoint>,
    pub transmission: Vec<RatePoint>,
    pub population: Option<u64>,
    pub failing: HashSet<&'static str>,
    pub slow_first: HashSet<&'static str>,
    pub delays_ms: HashMap<&'static str, Vec<u64>>,
    pub continent_rounds: Vec<Vec<ContinentTotal>>,
    pub history_rounds: Vec<Vec<RawCaseRecord>>,
    pub calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeSource {
    async fn respond<T: Default>(
        &self,
        endpoint: &'static str,
        value: impl FnOnce(usize) -> T,
    ) -> Result<T, RemoteError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(endpoint).or_insert(0);
            *count += 1;
            *count
        };

        if let Some(delay) = self.delays_ms.get(endpoint).and_then(|d| d.get(call - 1)) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }
        if self.failing.contains(endpoint) {
            return Err(RemoteError::Unavailable);
        }
        if call == 1 && self.slow_first.contains(endpoint) {
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Ok(T::default());
        }
        Ok(value(call))
    }
}

/// Answer for the `call`-th request (1-based), falling back to `fixed`
fn round<T: Clone>(rounds: &[T], fixed: &T, call: usize) -> T {
    rounds.get(call - 1).unwrap_or(fixed).clone()
}

#[async_trait]
impl PandemicSource for FakeSource {
    async fn case_records(&self) -> Result<Vec<RawCaseRecord>, RemoteError> {
        self.respond("case_records", |_| self.records.clone()).await
    }

    async fn virus_totals(&self) -> Result<Vec<VirusTotal>, RemoteError> {
        self.respond("virus_totals", |_| self.virus_totals.clone()).await
    }

    async fn continent_totals(&self, _pandemic: &str) -> Result<Vec<ContinentTotal>, RemoteError> {
        self.respond("continent_totals", |call| {
            round(&self.continent_rounds, &self.continents, call)
        })
        .await
    }

    async fn countries(&self) -> Result<Vec<Country>, RemoteError> {
        self.respond("countries", |_| self.countries.clone()).await
    }

    async fn country_history(
        &self,
        _country_code: &str,
        _pandemic: &str,
    ) -> Result<Vec<RawCaseRecord>, RemoteError> {
        self.respond("country_history", |call| {
            round(&self.history_rounds, &self.history, call)
        })
        .await
    }

    async fn predictions(
        &self,
        _pandemic: &str,
        _country_code: &str,
    ) -> Result<Vec<PredictionPoint>, RemoteError> {
        self.respond("predictions", |_| self.predictions.clone()).await
    }

    async fn mortality_rates(
        &self,
        _pandemic: &str,
        _country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError> {
        self.respond("mortality_rates", |_| self.mortality.clone()).await
    }

    async fn transmission_rates(
        &self,
        _pandemic: &str,
        _country_code: &str,
    ) -> Result<Vec<RatePoint>, RemoteError> {
        self.respond("transmission_rates", |_| self.transmission.clone()).await
    }

    async fn population(&self, _country_code: &str) -> Result<Option<u64>, RemoteError> {
        self.respond("population", |_| self.population).await
    }
}

/// Canned reference console accepting `admin` / `secret`
pub(crate) struct FakeConsole;

pub(crate) const FAKE_TOKEN: &str = "tok-admin";

#[async_trait]
impl ReferenceConsole for FakeConsole {
    async fn list(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, RemoteError> {
        Ok(match kind {
            ReferenceKind::Continents => vec![ReferenceItem::Continent(Continent {
                id: 1,
                name: "Europe".to_string(),
            })],
            _ => Vec::new(),
        })
    }

    async fn create(
        &self,
        token: &str,
        item: &NewReferenceItem,
    ) -> Result<ReferenceItem, RemoteError> {
        if token != FAKE_TOKEN {
            return Err(RemoteError::Unauthorized);
        }
        match item {
            NewReferenceItem::Continent(c) => Ok(ReferenceItem::Continent(Continent {
                id: 2,
                name: c.name.clone(),
            })),
            _ => Err(RemoteError::ApiError {
                status: 422,
                message: "unsupported in fake".to_string(),
            }),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, RemoteError> {
        if username == "admin" && password == "secret" {
            Ok(TokenResponse {
                access_token: FAKE_TOKEN.to_string(),
                token_type: "bearer".to_string(),
            })
        } else {
            Err(RemoteError::Unauthorized)
        }
    }
}
