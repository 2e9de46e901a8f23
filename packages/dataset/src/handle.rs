//! Caller-owned, immutable snapshot of both loaded tables.

use std::sync::Arc;

use world_population_dataset_models::{GeometryTable, PopulationTable, SourceFingerprint};

use crate::config::DatasetConfig;
use crate::progress::ProgressCallback;
use crate::{LoadError, load_geometry_table, load_population_table};

/// Both validated tables, loaded together and never mutated afterwards.
///
/// Cloning is cheap (the tables are shared through [`Arc`]) and the handle is
/// `Send + Sync`, so concurrent readers need no locking. Refreshing builds a
/// new handle; existing clones keep seeing the tables they were built from.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    population: Arc<PopulationTable>,
    geometry: Arc<GeometryTable>,
}

impl DatasetHandle {
    /// Loads both tables described by `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoadError`] from either table. There is nothing
    /// useful to compute without both, so no partial handle is produced.
    pub async fn load(
        config: &DatasetConfig,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, LoadError> {
        let population = load_population_table(&config.population, progress).await?;
        let geometry = load_geometry_table(&config.geometry, progress).await?;
        Ok(Self::from_tables(population, geometry))
    }

    #[must_use]
    pub fn from_tables(population: PopulationTable, geometry: GeometryTable) -> Self {
        Self {
            population: Arc::new(population),
            geometry: Arc::new(geometry),
        }
    }

    /// Re-loads both sources into a new handle, leaving `self` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if either source fails to load.
    pub async fn refresh(
        &self,
        config: &DatasetConfig,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, LoadError> {
        let fresh = Self::load(config, progress).await?;
        if fresh.fingerprints() == self.fingerprints() {
            log::info!("Refreshed datasets are unchanged");
        } else {
            log::info!(
                "Refreshed datasets changed (population {}, boundaries {})",
                fresh.population.fingerprint().sha256,
                fresh.geometry.fingerprint().sha256
            );
        }
        Ok(fresh)
    }

    #[must_use]
    pub fn population(&self) -> &PopulationTable {
        &self.population
    }

    #[must_use]
    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    /// Fingerprints of the population and boundary sources, in that order.
    /// Suitable as a cache key for anything derived from this handle.
    #[must_use]
    pub fn fingerprints(&self) -> (&SourceFingerprint, &SourceFingerprint) {
        (self.population.fingerprint(), self.geometry.fingerprint())
    }

    /// Sorted, de-duplicated selectable country names.
    #[must_use]
    pub fn countries(&self) -> Vec<&str> {
        self.population.countries()
    }
}
