//! Where the two datasets live and how their columns are named.
//!
//! The binding between the population key column and the geometry key
//! property lives here rather than in the join code, since the two sources
//! are free to name their identifier fields differently.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use world_population_dataset_models::{KNOWN_YEARS, Year};

const WORLD_POPULATION_CSV_URL: &str = "https://raw.githubusercontent.com/tommyscodebase/12_Days_Geospatial_Python_Bootcamp/main/13_final_project_data/world_population.csv";
const WORLD_GEOJSON_URL: &str = "https://raw.githubusercontent.com/tommyscodebase/12_Days_Geospatial_Python_Bootcamp/main/13_final_project_data/world.geojson";

/// Location of a raw dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Downloaded over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    Path(PathBuf),
}

impl DataSource {
    /// Stable identifier used in logs, errors and fingerprints.
    #[must_use]
    pub fn source_id(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source_id())
    }
}

/// Raw shape of the population CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationLayout {
    /// One column per year, named `"<year><year_column_suffix>"`.
    #[default]
    Wide,
    /// One row per `(country, year)` with `year_column` and
    /// `population_column`.
    Long,
}

/// Population CSV source and column bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationSourceConfig {
    pub source: DataSource,
    pub layout: PopulationLayout,
    /// Column holding the country name (the join key on this side).
    pub key_column: String,
    /// Years every record must carry.
    pub years: Vec<Year>,
    /// Wide layout: suffix after the year in per-year column names.
    pub year_column_suffix: String,
    /// Long layout: column holding the year (`2022` or `"2022 Population"`).
    pub year_column: String,
    /// Long layout: column holding the population value.
    pub population_column: String,
    pub area_column: String,
    pub density_column: String,
    pub growth_rate_column: String,
    pub world_percentage_column: String,
    pub rank_column: Option<String>,
    pub code_column: Option<String>,
    pub capital_column: Option<String>,
    pub continent_column: Option<String>,
}

impl Default for PopulationSourceConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(WORLD_POPULATION_CSV_URL.to_string()),
            layout: PopulationLayout::Wide,
            key_column: "Country/Territory".to_string(),
            years: KNOWN_YEARS.to_vec(),
            year_column_suffix: " Population".to_string(),
            year_column: "Year".to_string(),
            population_column: "Population".to_string(),
            area_column: "Area (km²)".to_string(),
            density_column: "Density (per km²)".to_string(),
            growth_rate_column: "Growth Rate".to_string(),
            world_percentage_column: "World Population Percentage".to_string(),
            rank_column: Some("Rank".to_string()),
            code_column: Some("CCA3".to_string()),
            capital_column: Some("Capital".to_string()),
            continent_column: Some("Continent".to_string()),
        }
    }
}

/// Boundary `GeoJSON` source and property bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometrySourceConfig {
    pub source: DataSource,
    /// Feature property holding the territory name (the join key on this
    /// side).
    pub key_property: String,
    pub capital_property: Option<String>,
    /// Feature property holding an ISO alpha-3 code, if any.
    pub code_property: Option<String>,
}

impl Default for GeometrySourceConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(WORLD_GEOJSON_URL.to_string()),
            key_property: "name".to_string(),
            capital_property: Some("Capital".to_string()),
            code_property: Some("id".to_string()),
        }
    }
}

/// Both dataset sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    pub population: PopulationSourceConfig,
    pub geometry: GeometrySourceConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_url_sources() {
        let config: DatasetConfig = toml::from_str(
            r#"
            [population]
            source = { path = "data/world_population.csv" }
            key_column = "Country"

            [geometry]
            source = { url = "https://example.com/world.geojson" }
            key_property = "ADMIN"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.population.source,
            DataSource::Path(PathBuf::from("data/world_population.csv"))
        );
        assert_eq!(config.population.key_column, "Country");
        assert_eq!(config.population.years, KNOWN_YEARS.to_vec());
        assert_eq!(config.geometry.key_property, "ADMIN");
        assert_eq!(
            config.geometry.source.source_id(),
            "https://example.com/world.geojson"
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: DatasetConfig = toml::from_str("").unwrap();
        assert_eq!(config, DatasetConfig::default());
        assert_eq!(config.population.layout, PopulationLayout::Wide);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<DatasetConfig, _> = toml::from_str(
            r#"
            [population]
            key_colum = "typo"
            "#,
        );
        assert!(result.is_err());
    }
}
