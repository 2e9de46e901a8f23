#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population and country boundary table types.
//!
//! These are the validated, in-memory shapes produced by the dataset loader:
//! a [`PopulationTable`] keyed by country name and a [`GeometryTable`] of
//! country boundary polygons keyed by a (possibly different) name property.
//! Neither table is mutated after it is built.

pub mod geometry;
pub mod population;
pub mod year;

use serde::{Deserialize, Serialize};

pub use geometry::{CountryGeometry, GeometryTable};
pub use population::{PopulationObservation, PopulationRecord, PopulationTable};
pub use year::{KNOWN_YEARS, ParseYearError, Year};

/// Identifies the exact bytes a table was parsed from.
///
/// Anything that memoizes loaded tables should key on this rather than on
/// the loader call itself, so a changed upstream file is never served from a
/// stale entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFingerprint {
    /// Where the bytes came from (URL or file path).
    pub source_id: String,
    /// Lowercase hex SHA-256 of the raw bytes.
    pub sha256: String,
}
