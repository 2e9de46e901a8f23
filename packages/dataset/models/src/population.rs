//! Per-country population table.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{SourceFingerprint, Year};

/// One country row of the population dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    /// Country or territory name, the primary key of this table.
    pub country_name: String,
    /// Population per census year. Values are not assumed to grow.
    pub populations: BTreeMap<Year, u64>,
    /// Land area as published by the dataset, in km².
    pub area_km2: f64,
    /// Population density as published by the dataset, per km².
    pub density_per_km2: f64,
    /// Year-over-year growth rate as published (e.g. `1.0024`).
    pub growth_rate: f64,
    /// Share of the world population as published, 0–100.
    pub world_population_percentage: f64,
    /// Rank by population, when the source has a rank column.
    pub rank: Option<u32>,
    /// ISO 3166-1 alpha-3 code (`CCA3`), when present.
    pub cca3: Option<String>,
    /// Capital city name, when present.
    pub capital: Option<String>,
    /// Continent name, when present.
    pub continent: Option<String>,
}

impl PopulationRecord {
    #[must_use]
    pub fn population(&self, year: Year) -> Option<u64> {
        self.populations.get(&year).copied()
    }

    /// The years this record has a population for, ascending.
    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.populations.keys().copied()
    }
}

/// A single `(country, year, population)` row of the long-form view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationObservation {
    pub country: String,
    pub year: Year,
    pub population: u64,
}

/// The validated population table.
///
/// Every record carries a population for every year in [`Self::years`].
/// World totals are summed once at construction over every record.
#[derive(Debug, Clone)]
pub struct PopulationTable {
    fingerprint: SourceFingerprint,
    years: BTreeSet<Year>,
    records: Vec<PopulationRecord>,
    world_totals: BTreeMap<Year, u64>,
}

impl PopulationTable {
    /// Builds a table from already-validated records.
    ///
    /// The caller guarantees that each record's year set equals `years`.
    #[must_use]
    pub fn new(
        fingerprint: SourceFingerprint,
        years: BTreeSet<Year>,
        records: Vec<PopulationRecord>,
    ) -> Self {
        let world_totals = years
            .iter()
            .map(|year| {
                let total = records.iter().filter_map(|r| r.population(*year)).sum();
                (*year, total)
            })
            .collect();

        Self {
            fingerprint,
            years,
            records,
            world_totals,
        }
    }

    #[must_use]
    pub const fn fingerprint(&self) -> &SourceFingerprint {
        &self.fingerprint
    }

    #[must_use]
    pub const fn years(&self) -> &BTreeSet<Year> {
        &self.years
    }

    #[must_use]
    pub fn has_year(&self, year: Year) -> bool {
        self.years.contains(&year)
    }

    /// Records in source order.
    #[must_use]
    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose `country_name` equals `name`, in source order.
    #[must_use]
    pub fn matching(&self, name: &str) -> Vec<&PopulationRecord> {
        self.records
            .iter()
            .filter(|r| r.country_name == name)
            .collect()
    }

    /// Sum of every record's population for `year`, or `None` if the table
    /// does not carry that year.
    #[must_use]
    pub fn world_total(&self, year: Year) -> Option<u64> {
        self.world_totals.get(&year).copied()
    }

    /// Sorted, de-duplicated country names.
    #[must_use]
    pub fn countries(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.country_name.as_str())
            .collect();
        names.into_iter().collect()
    }

    /// The table in long form, one row per `(country, year)`, in record
    /// order and ascending year within a record.
    pub fn observations(&self) -> impl Iterator<Item = PopulationObservation> + '_ {
        self.records.iter().flat_map(|record| {
            record
                .populations
                .iter()
                .map(move |(year, population)| PopulationObservation {
                    country: record.country_name.clone(),
                    year: *year,
                    population: *population,
                })
        })
    }
}
