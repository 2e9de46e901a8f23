//! Application configuration.
//!
//! Defaults are embedded from `config/default.toml`. A user file passed with
//! `--config` is layered on top: each key it sets inside a section replaces
//! the default for that key, everything else keeps its default.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use world_population_dataset::{DatasetConfig, GeometrySourceConfig, PopulationSourceConfig};
use world_population_metrics::{MetricsConfig, ReconcileConfig, StatsConfig};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or does not fit the schema.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config parsed but its values contradict each other.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub population: PopulationSourceConfig,
    pub geometry: GeometrySourceConfig,
    pub reconcile: ReconcileConfig,
    pub stats: StatsConfig,
}

impl AppConfig {
    /// Loads the embedded defaults, overlaid with the file at `path` when
    /// given.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If either document is not valid TOML or has unknown keys
    /// * If the merged values are inconsistent
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let overlay = path
            .map(|path| {
                log::debug!("Reading config from {}", path.display());
                std::fs::read_to_string(path)
            })
            .transpose()?;

        Self::from_toml_strs(DEFAULT_CONFIG, overlay.as_deref())
    }

    /// Parses `base` and layers `overlay` on top of it.
    ///
    /// # Errors
    ///
    /// * If either document is not valid TOML or has unknown keys
    /// * If the merged values are inconsistent
    pub fn from_toml_strs(base: &str, overlay: Option<&str>) -> Result<Self, ConfigError> {
        let mut merged: toml::Table = toml::from_str(base)?;

        if let Some(overlay) = overlay {
            let overlay: toml::Table = toml::from_str(overlay)?;
            merge_sections(&mut merged, overlay);
        }

        let config: Self = toml::Value::Table(merged).try_into()?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn dataset(&self) -> DatasetConfig {
        DatasetConfig {
            population: self.population.clone(),
            geometry: self.geometry.clone(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsConfig {
        MetricsConfig {
            reconcile: self.reconcile.clone(),
            stats: self.stats.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let years = &self.population.years;

        if years.is_empty() {
            return Err(ConfigError::Invalid(
                "population.years must list at least one year".to_string(),
            ));
        }
        if self.population.key_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "population.key_column must not be empty".to_string(),
            ));
        }
        if self.geometry.key_property.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "geometry.key_property must not be empty".to_string(),
            ));
        }
        if !years.contains(&self.stats.year) {
            return Err(ConfigError::Invalid(format!(
                "stats.year {} is not one of population.years",
                self.stats.year
            )));
        }
        if let Some(year) = self
            .stats
            .default_series_years
            .iter()
            .find(|year| !years.contains(year))
        {
            return Err(ConfigError::Invalid(format!(
                "stats.default_series_years contains {year}, which is not one of population.years"
            )));
        }
        if !(self.stats.area_tolerance.is_finite() && self.stats.area_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stats.area_tolerance must be positive, got {}",
                self.stats.area_tolerance
            )));
        }

        Ok(())
    }
}

/// Replaces keys of each `base` section with the ones `overlay` sets.
///
/// Values are replaced whole below the section level so that e.g. a
/// `source = { path = ... }` override does not get merged into the default
/// `source = { url = ... }`.
fn merge_sections(base: &mut toml::Table, overlay: toml::Table) {
    for (section, value) in overlay {
        match (base.get_mut(&section), value) {
            (Some(toml::Value::Table(base_section)), toml::Value::Table(overlay_section)) => {
                base_section.extend(overlay_section);
            }
            (_, value) => {
                base.insert(section, value);
            }
        }
    }
}
