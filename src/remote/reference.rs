//! Reference data
//!
//! Continents, countries, virus families, viruses and pandemics managed
//! through the admin console. Creation payloads are validated locally
//! before they are sent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of reference record, mapped to its remote collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Continents,
    Countries,
    Families,
    Viruses,
    Pandemics,
}

impl ReferenceKind {
    /// Get all kinds for iteration
    pub fn all() -> &'static [ReferenceKind] {
        &[
            ReferenceKind::Continents,
            ReferenceKind::Countries,
            ReferenceKind::Families,
            ReferenceKind::Viruses,
            ReferenceKind::Pandemics,
        ]
    }

    /// Collection path on the remote API
    pub fn path(&self) -> &'static str {
        match self {
            ReferenceKind::Continents => "/continents/",
            ReferenceKind::Countries => "/pays/",
            ReferenceKind::Families => "/familles/",
            ReferenceKind::Viruses => "/virus/",
            ReferenceKind::Pandemics => "/pandemies/",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Continents => write!(f, "continents"),
            ReferenceKind::Countries => write!(f, "countries"),
            ReferenceKind::Families => write!(f, "families"),
            ReferenceKind::Viruses => write!(f, "viruses"),
            ReferenceKind::Pandemics => write!(f, "pandemics"),
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continents" | "continent" => Ok(ReferenceKind::Continents),
            "countries" | "country" | "pays" => Ok(ReferenceKind::Countries),
            "families" | "family" | "familles" => Ok(ReferenceKind::Families),
            "viruses" | "virus" => Ok(ReferenceKind::Viruses),
            "pandemics" | "pandemic" | "pandemies" => Ok(ReferenceKind::Pandemics),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continent {
    pub id: i64,
    #[serde(rename = "nom_continent")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContinent {
    #[serde(rename = "nom_continent")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub continent_id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    /// ISO-3166 alpha-2 code
    #[serde(rename = "code_lettre")]
    pub alpha2: String,
    /// ISO-3166 numeric code
    #[serde(rename = "code_chiffre")]
    pub numeric: String,
    /// ISO-3166 alpha-3 code
    #[serde(rename = "code_iso3166")]
    pub alpha3: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCountry {
    pub continent_id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "code_lettre")]
    pub alpha2: String,
    #[serde(rename = "code_chiffre")]
    pub numeric: String,
    #[serde(rename = "code_iso3166")]
    pub alpha3: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirusFamily {
    #[serde(rename = "id_famille")]
    pub id: i64,
    #[serde(rename = "nom_famille")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVirusFamily {
    #[serde(rename = "nom_famille")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Virus {
    pub id: i64,
    #[serde(rename = "id_famille")]
    pub family_id: i64,
    #[serde(rename = "nom_virus")]
    pub name: String,
    #[serde(default, rename = "nom_scientifique")]
    pub scientific_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVirus {
    #[serde(rename = "id_famille")]
    pub family_id: i64,
    #[serde(rename = "nom_virus")]
    pub name: String,
    #[serde(default, rename = "nom_scientifique")]
    pub scientific_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pandemic {
    #[serde(rename = "id_pandemie")]
    pub id: i64,
    pub virus_id: i64,
    #[serde(rename = "date_apparition")]
    pub started_on: NaiveDate,
    #[serde(default, rename = "date_fin")]
    pub ended_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "nom_maladie")]
    pub disease_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPandemic {
    pub virus_id: i64,
    #[serde(rename = "date_apparition")]
    pub started_on: NaiveDate,
    #[serde(default, rename = "date_fin")]
    pub ended_on: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "nom_maladie")]
    pub disease_name: String,
}

/// A reference record of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReferenceItem {
    Continent(Continent),
    Country(Country),
    Family(VirusFamily),
    Virus(Virus),
    Pandemic(Pandemic),
}

impl ReferenceItem {
    /// Identifier and display name
    pub fn summary(&self) -> (i64, &str) {
        match self {
            ReferenceItem::Continent(c) => (c.id, &c.name),
            ReferenceItem::Country(c) => (c.id, &c.name),
            ReferenceItem::Family(f) => (f.id, &f.name),
            ReferenceItem::Virus(v) => (v.id, &v.name),
            ReferenceItem::Pandemic(p) => (p.id, &p.disease_name),
        }
    }
}

/// A creation payload of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NewReferenceItem {
    Continent(NewContinent),
    Country(NewCountry),
    Family(NewVirusFamily),
    Virus(NewVirus),
    Pandemic(NewPandemic),
}

impl NewReferenceItem {
    /// Parse a JSON body as the payload for `kind`
    pub fn from_json(kind: ReferenceKind, body: serde_json::Value) -> Result<Self, ValidationError> {
        let malformed = |e: serde_json::Error| ValidationError::Malformed {
            kind,
            error: e.to_string(),
        };

        Ok(match kind {
            ReferenceKind::Continents => {
                NewReferenceItem::Continent(serde_json::from_value(body).map_err(malformed)?)
            }
            ReferenceKind::Countries => {
                NewReferenceItem::Country(serde_json::from_value(body).map_err(malformed)?)
            }
            ReferenceKind::Families => {
                NewReferenceItem::Family(serde_json::from_value(body).map_err(malformed)?)
            }
            ReferenceKind::Viruses => {
                NewReferenceItem::Virus(serde_json::from_value(body).map_err(malformed)?)
            }
            ReferenceKind::Pandemics => {
                NewReferenceItem::Pandemic(serde_json::from_value(body).map_err(malformed)?)
            }
        })
    }

    /// Collection this payload belongs to
    pub fn kind(&self) -> ReferenceKind {
        match self {
            NewReferenceItem::Continent(_) => ReferenceKind::Continents,
            NewReferenceItem::Country(_) => ReferenceKind::Countries,
            NewReferenceItem::Family(_) => ReferenceKind::Families,
            NewReferenceItem::Virus(_) => ReferenceKind::Viruses,
            NewReferenceItem::Pandemic(_) => ReferenceKind::Pandemics,
        }
    }

    /// Check the payload before it is sent
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            NewReferenceItem::Continent(c) => require("name", &c.name),
            NewReferenceItem::Family(f) => require("name", &f.name),
            NewReferenceItem::Virus(v) => require("name", &v.name),
            NewReferenceItem::Country(c) => {
                require("name", &c.name)?;
                require("alpha2", &c.alpha2)?;
                require("numeric", &c.numeric)?;
                require("alpha3", &c.alpha3)
            }
            NewReferenceItem::Pandemic(p) => {
                require("disease_name", &p.disease_name)?;
                match p.ended_on {
                    Some(end) if end < p.started_on => Err(ValidationError::EndBeforeStart {
                        start: p.started_on,
                        end,
                    }),
                    _ => Ok(()),
                }
            }
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(())
    }
}

/// Reference payload rejected before sending
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{0}' cannot be empty")]
    Empty(&'static str),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Unknown reference kind: {0}. Use continents, countries, families, viruses or pandemics")]
    UnknownKind(String),

    #[error("Malformed {kind} payload: {error}")]
    Malformed { kind: ReferenceKind, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("continents".parse::<ReferenceKind>(), Ok(ReferenceKind::Continents));
        assert_eq!("PAYS".parse::<ReferenceKind>(), Ok(ReferenceKind::Countries));
        assert_eq!("virus".parse::<ReferenceKind>(), Ok(ReferenceKind::Viruses));
        assert!("planets".parse::<ReferenceKind>().is_err());
        assert_eq!(ReferenceKind::Families.path(), "/familles/");
    }

    #[test]
    fn test_country_uses_wire_names() {
        let country: Country = serde_json::from_value(json!({
            "id": 1,
            "continent_id": 2,
            "nom": "France",
            "code_lettre": "FR",
            "code_chiffre": "250",
            "code_iso3166": "FRA"
        }))
        .unwrap();
        assert_eq!(country.alpha2, "FR");
        assert_eq!(country.alpha3, "FRA");

        let json = serde_json::to_value(ReferenceItem::Country(country)).unwrap();
        assert_eq!(json["nom"], "France");
    }

    #[test]
    fn test_from_json_and_validate() {
        let item = NewReferenceItem::from_json(
            ReferenceKind::Continents,
            json!({"nom_continent": "Europe"}),
        )
        .unwrap();
        assert_eq!(item.kind(), ReferenceKind::Continents);
        assert!(item.validate().is_ok());

        let blank = NewReferenceItem::from_json(
            ReferenceKind::Families,
            json!({"nom_famille": "   "}),
        )
        .unwrap();
        assert_eq!(blank.validate(), Err(ValidationError::Empty("name")));

        let malformed = NewReferenceItem::from_json(ReferenceKind::Viruses, json!({"nom_virus": 3}));
        assert!(matches!(malformed, Err(ValidationError::Malformed { .. })));
    }

    #[test]
    fn test_pandemic_end_before_start_rejected() {
        let item = NewReferenceItem::Pandemic(NewPandemic {
            virus_id: 1,
            started_on: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            ended_on: NaiveDate::from_ymd_opt(2019, 12, 31),
            description: None,
            disease_name: "COVID-19".to_string(),
        });
        assert!(matches!(
            item.validate(),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_reference_item_summary() {
        let item = ReferenceItem::Family(VirusFamily {
            id: 3,
            name: "Coronaviridae".to_string(),
        });
        assert_eq!(item.summary(), (3, "Coronaviridae"));
    }
}
