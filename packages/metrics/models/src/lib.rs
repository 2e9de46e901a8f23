#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Country profile and derived statistics types.
//!
//! A [`CountryProfile`] is built fresh for every country selection, handed
//! to the presentation layer and then dropped. Nothing here is persisted.

use serde::{Deserialize, Serialize};
use world_population_dataset_models::Year;

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// How the representative point was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Guaranteed to lie inside the boundary.
    Interior,
    /// Geometric centroid; may fall outside a concave boundary.
    Centroid,
}

/// Which reconciliation step joined the two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Identical names.
    Exact,
    /// Via the alias table.
    Alias,
    /// Identical after case folding and punctuation stripping.
    Normalized,
    /// Identical ISO alpha-3 codes.
    Code,
}

/// Population-derived statistics for one country and year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub year: Year,
    pub population: u64,
    pub area_km2: f64,
    pub density_per_km2: f64,
    /// Share of the summed population of every country in the table, 0–100.
    pub world_population_percentage: f64,
}

/// The dataset's own precomputed figures, kept alongside the derived ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedFigures {
    pub area_km2: f64,
    pub density_per_km2: f64,
    pub growth_rate: f64,
    pub world_population_percentage: f64,
}

/// One point of a population time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub year: Year,
    pub population: u64,
}

/// Everything the presentation layer needs to render one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryProfile {
    /// Name as selected from the population table.
    pub country_name: String,
    /// Name of the matched boundary; differs from `country_name` when the
    /// join went through an alias, normalization or code.
    pub geometry_name: String,
    pub match_kind: MatchKind,
    pub stats_year: Year,
    pub population: u64,
    /// Computed on an equal-area projection of the boundary.
    pub area_km2: f64,
    pub density_per_km2: f64,
    pub world_population_percentage: f64,
    /// Map placement only; never used for metrics.
    pub representative_point: LonLat,
    pub point_kind: PointKind,
    pub capital_name: Option<String>,
    /// Ascending by year.
    pub population_series: Vec<SeriesPoint>,
    pub reported: ReportedFigures,
}

/// Names that failed to join under the configured matching policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub matched: usize,
    /// Population names with no boundary, sorted.
    pub population_only: Vec<String>,
    /// Boundary names no population row resolves to, sorted.
    pub geometry_only: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_profiles_in_camel_case() {
        let profile = CountryProfile {
            country_name: "France".to_string(),
            geometry_name: "France".to_string(),
            match_kind: MatchKind::Exact,
            stats_year: Year::new(2022),
            population: 64_756_584,
            area_km2: 551_695.0,
            density_per_km2: 117.4,
            world_population_percentage: 0.81,
            representative_point: LonLat { lon: 2.5, lat: 46.5 },
            point_kind: PointKind::Interior,
            capital_name: Some("Paris".to_string()),
            population_series: vec![SeriesPoint {
                year: Year::new(2022),
                population: 64_756_584,
            }],
            reported: ReportedFigures {
                area_km2: 551_695.0,
                density_per_km2: 117.3767,
                growth_rate: 1.0015,
                world_population_percentage: 0.81,
            },
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["countryName"], "France");
        assert_eq!(value["matchKind"], "exact");
        assert_eq!(value["pointKind"], "interior");
        assert_eq!(value["statsYear"], 2022);
        assert_eq!(value["populationSeries"][0]["population"], 64_756_584);
        assert_eq!(value["representativePoint"]["lon"], 2.5);
    }
}
