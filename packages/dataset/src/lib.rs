#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading for the world population profiles.
//!
//! Fetches the population CSV and the country boundary `GeoJSON` (over HTTP
//! or from disk), parses them into validated tables and freezes both into a
//! caller-owned [`DatasetHandle`]. Loading either returns a complete table or
//! a typed [`LoadError`]; partial tables are never produced.

pub mod config;
pub mod fetch;
pub mod geometry;
pub mod handle;
pub mod population;
pub mod progress;

use std::sync::Arc;

use thiserror::Error;
use world_population_dataset_models::{GeometryTable, PopulationTable};

pub use config::{DataSource, DatasetConfig, GeometrySourceConfig, PopulationSourceConfig};
pub use handle::DatasetHandle;
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Broad classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The source could not be reached, read or parsed.
    Fetch,
    /// The source parsed but lacks a required field or holds an invalid
    /// value.
    Schema,
}

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// I/O error reading a local source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Source bytes were not UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A required column or property is absent.
    #[error("{source_id}: missing required field '{field}'")]
    MissingField {
        /// Source the field was expected in.
        source_id: String,
        /// Name of the missing column or property.
        field: String,
    },

    /// A cell holds a value that does not fit the schema.
    #[error("{source_id}: row {row}, field '{field}': invalid value '{value}' ({reason})")]
    InvalidValue {
        source_id: String,
        /// 1-based data row (or feature) number.
        row: usize,
        field: String,
        value: String,
        reason: &'static str,
    },

    /// A record does not carry exactly the table's year set.
    #[error("{source_id}: '{country}' {message}")]
    InconsistentYears {
        source_id: String,
        country: String,
        message: String,
    },

    /// A feature has no geometry at all.
    #[error("{source_id}: feature {feature} has no geometry")]
    MissingGeometry { source_id: String, feature: usize },

    /// The `GeoJSON` document is a bare geometry rather than features.
    #[error("{source_id}: expected a FeatureCollection")]
    NotAFeatureCollection { source_id: String },
}

impl LoadError {
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Http(_)
            | Self::HttpStatus { .. }
            | Self::Io(_)
            | Self::Csv(_)
            | Self::GeoJson(_)
            | Self::Utf8(_) => LoadErrorKind::Fetch,
            Self::MissingField { .. }
            | Self::InvalidValue { .. }
            | Self::InconsistentYears { .. }
            | Self::MissingGeometry { .. }
            | Self::NotAFeatureCollection { .. } => LoadErrorKind::Schema,
        }
    }
}

/// Fetches and validates the population table.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be fetched or parsed, or if a
/// required column is missing or holds an invalid value.
pub async fn load_population_table(
    config: &PopulationSourceConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PopulationTable, LoadError> {
    progress.set_message(format!("Loading population table from {}", config.source));
    let bytes = fetch::fetch_bytes(&config.source, progress).await?;
    let table = population::parse_population_csv(&bytes, config)?;
    progress.finish(format!("Loaded {} population records", table.len()));
    Ok(table)
}

/// Fetches and validates the country boundary table.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be fetched or parsed, or if a
/// feature lacks its key property or geometry.
pub async fn load_geometry_table(
    config: &GeometrySourceConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<GeometryTable, LoadError> {
    progress.set_message(format!("Loading boundaries from {}", config.source));
    let bytes = fetch::fetch_bytes(&config.source, progress).await?;
    let table = geometry::parse_geometry_geojson(&bytes, config)?;
    progress.finish(format!("Loaded {} boundaries", table.len()));
    Ok(table)
}
