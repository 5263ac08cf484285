//! Remote Pandemic API
//!
//! Everything the dashboard knows comes from the remote API: case
//! records, latest totals, per-country history, model outputs and the
//! reference data behind the admin console. Country population comes
//! from a separate metadata service.
//!
//! ## Architecture
//!
//! - **ApiClient**: reqwest-based HTTP client for both services
//! - **PandemicSource**: read-side trait the dashboard consumes
//! - **ReferenceConsole**: reference-data listing, creation and login

mod client;
mod dto;
mod reference;
mod source;

pub use client::{ApiClient, RemoteConfig, RemoteError};
pub use dto::{ContinentTotal, LoginRequest, TokenResponse, VirusTotal};
pub use reference::{
    Continent, Country, NewContinent, NewCountry, NewPandemic, NewReferenceItem, NewVirus,
    NewVirusFamily, Pandemic, ReferenceItem, ReferenceKind, ValidationError, Virus, VirusFamily,
};
pub use source::{PandemicSource, ReferenceConsole};
