//! Case Records
//!
//! Raw case observations as delivered by the remote API and the
//! normalizer that folds them into the virus → date → country index
//! every dashboard view is derived from.
//!
//! ## Data Flow
//!
//! 1. `/suivis/` rows arrive as [`RawCaseRecord`] (every field optional)
//! 2. Rows missing a required field are dropped, the rest become [`CaseRecord`]
//! 3. [`normalize`] builds a [`VirusDateCountryIndex`] (last write wins)

mod normalizer;
mod types;

pub use normalizer::{normalize, VirusDateCountryIndex};
pub use types::{parse_day, CaseRecord, RawCaseRecord, UNKNOWN_VIRUS};
