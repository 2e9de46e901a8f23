//! Assembles a [`CountryProfile`] for one country selection.

use world_population_dataset::DatasetHandle;
use world_population_dataset_models::Year;
use world_population_metrics_models::{CountryProfile, ReportedFigures};

use crate::area::{compute_area_km2, representative_point};
use crate::config::MetricsConfig;
use crate::reconcile::resolve;
use crate::stats::{compute_stats, extract_series};
use crate::{ProfileError, StatsError};

/// One country selection from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRequest {
    pub country_key: String,
    /// Year density and world share are computed for.
    pub stats_year: Year,
    /// Years to include in the series, any order.
    pub series_years: Vec<Year>,
}

impl ProfileRequest {
    /// A request using the configured stats year and default series years.
    #[must_use]
    pub fn with_defaults(country_key: &str, config: &MetricsConfig) -> Self {
        Self {
            country_key: country_key.to_string(),
            stats_year: config.stats.year,
            series_years: config.stats.default_series_years.clone(),
        }
    }
}

/// Builds the profile for `request` from the tables in `handle`.
///
/// # Errors
///
/// Returns [`ProfileError`] if the country does not join, its boundary
/// cannot be measured, or its statistics cannot be derived for the
/// requested year.
pub fn build_profile(
    handle: &DatasetHandle,
    request: &ProfileRequest,
    config: &MetricsConfig,
) -> Result<CountryProfile, ProfileError> {
    let resolution = resolve(
        &request.country_key,
        handle.population(),
        handle.geometry(),
        &config.reconcile,
    )?;
    let record = resolution.record;
    let geometry = resolution.geometry;

    let world_total = handle
        .population()
        .world_total(request.stats_year)
        .ok_or(StatsError::UnknownYear {
            year: request.stats_year,
        })?;

    let area_km2 = compute_area_km2(&geometry.polygon, config.stats.area_projection)?;
    warn_on_area_mismatch(&record.country_name, area_km2, record.area_km2, config);

    let stats = compute_stats(record, area_km2, world_total, request.stats_year)?;
    let (representative_point, point_kind) = representative_point(&geometry.polygon)?;

    log::debug!(
        "Built profile for '{}' (boundary '{}', {:?} match)",
        record.country_name,
        geometry.name,
        resolution.match_kind
    );

    Ok(CountryProfile {
        country_name: record.country_name.clone(),
        geometry_name: geometry.name.clone(),
        match_kind: resolution.match_kind,
        stats_year: stats.year,
        population: stats.population,
        area_km2: stats.area_km2,
        density_per_km2: stats.density_per_km2,
        world_population_percentage: stats.world_population_percentage,
        representative_point,
        point_kind,
        capital_name: geometry
            .capital_name
            .clone()
            .or_else(|| record.capital.clone()),
        population_series: extract_series(record, &request.series_years),
        reported: ReportedFigures {
            area_km2: record.area_km2,
            density_per_km2: record.density_per_km2,
            growth_rate: record.growth_rate,
            world_population_percentage: record.world_population_percentage,
        },
    })
}

fn warn_on_area_mismatch(name: &str, computed: f64, reported: f64, config: &MetricsConfig) {
    let relative = (computed - reported).abs() / reported;
    if relative > config.stats.area_tolerance {
        log::warn!(
            "'{name}': boundary area {computed:.0} km² differs from published {reported:.0} km² by {:.0}%",
            relative * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::{MultiPolygon, polygon};
    use world_population_dataset_models::{
        CountryGeometry, GeometryTable, PopulationRecord, PopulationTable, SourceFingerprint,
    };
    use world_population_metrics_models::{MatchKind, PointKind, SeriesPoint};

    use super::*;
    use crate::config::MatchPolicy;
    use crate::{GeometryError, ReconcileError};

    fn fingerprint() -> SourceFingerprint {
        SourceFingerprint {
            source_id: "test".to_string(),
            sha256: String::new(),
        }
    }

    fn record(name: &str, pop_2020: u64, pop_2022: u64, area: f64) -> PopulationRecord {
        PopulationRecord {
            country_name: name.to_string(),
            populations: BTreeMap::from([(Year::new(2020), pop_2020), (Year::new(2022), pop_2022)]),
            area_km2: area,
            density_per_km2: 0.0,
            growth_rate: 1.0,
            world_population_percentage: 0.0,
            rank: None,
            cca3: None,
            capital: Some("Paris".to_string()),
            continent: None,
        }
    }

    /// A hexagon roughly covering mainland France.
    fn france_hexagon() -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: -4.5, y: 48.5),
            (x: 2.5, y: 51.0),
            (x: 8.0, y: 49.0),
            (x: 7.5, y: 43.5),
            (x: 3.0, y: 42.5),
            (x: -1.5, y: 43.5),
            (x: -4.5, y: 48.5),
        ]])
    }

    fn handle() -> DatasetHandle {
        let population = PopulationTable::new(
            fingerprint(),
            [Year::new(2020), Year::new(2022)].into_iter().collect(),
            vec![
                record("France", 64_480_053, 64_756_584, 551_695.0),
                record("United States", 335_942_003, 338_289_857, 9_372_610.0),
                record("Nowhere", 10, 10, 1.0),
                record("Tuvalu", 11_069, 11_312, 26.0),
            ],
        );
        let geometry = GeometryTable::new(
            fingerprint(),
            vec![
                CountryGeometry {
                    name: "France".to_string(),
                    polygon: france_hexagon(),
                    capital_name: None,
                    code: None,
                },
                CountryGeometry {
                    name: "United States of America".to_string(),
                    polygon: MultiPolygon(vec![polygon![
                        (x: -124.0, y: 49.0),
                        (x: -67.0, y: 49.0),
                        (x: -67.0, y: 25.0),
                        (x: -124.0, y: 25.0),
                        (x: -124.0, y: 49.0),
                    ]]),
                    capital_name: Some("Washington".to_string()),
                    code: None,
                },
                CountryGeometry {
                    name: "Nowhere".to_string(),
                    polygon: MultiPolygon(Vec::new()),
                    capital_name: None,
                    code: None,
                },
            ],
        );
        DatasetHandle::from_tables(population, geometry)
    }

    fn request(country: &str, years: &[u16]) -> ProfileRequest {
        ProfileRequest {
            country_key: country.to_string(),
            stats_year: Year::new(2022),
            series_years: years.iter().copied().map(Year::new).collect(),
        }
    }

    #[test]
    fn builds_france_profile() {
        let profile = build_profile(
            &handle(),
            &request("France", &[2022]),
            &MetricsConfig::default(),
        )
        .unwrap();

        assert_eq!(profile.country_name, "France");
        assert_eq!(
            profile.population_series,
            vec![SeriesPoint {
                year: Year::new(2022),
                population: 64_756_584
            }]
        );
        assert_eq!(profile.population, 64_756_584);
        assert_eq!(profile.match_kind, MatchKind::Exact);
        assert_eq!(profile.point_kind, PointKind::Interior);
        assert_eq!(profile.capital_name.as_deref(), Some("Paris"));
        assert!(
            (300_000.0..800_000.0).contains(&profile.area_km2),
            "area {}",
            profile.area_km2
        );
        assert!((profile.density_per_km2 - 64_756_584.0 / profile.area_km2).abs() < 1e-6);

        let point = profile.representative_point;
        assert!((-4.5..8.0).contains(&point.lon));
        assert!((42.5..51.0).contains(&point.lat));
    }

    #[test]
    fn shares_are_relative_to_every_record() {
        let handle = handle();
        let profile = build_profile(
            &handle,
            &request("France", &[]),
            &MetricsConfig::default(),
        )
        .unwrap();

        let total = 64_756_584.0 + 338_289_857.0 + 10.0 + 11_312.0;
        assert!((profile.world_population_percentage - 100.0 * 64_756_584.0 / total).abs() < 1e-9);
        assert!(profile.population_series.is_empty());
    }

    #[test]
    fn exact_policy_reports_united_states_not_found() {
        let err = build_profile(
            &handle(),
            &request("United States", &[2022]),
            &MetricsConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ProfileError::Reconcile(ReconcileError::NotFound { .. })
        ));
        assert_eq!(err.stage(), "reconciliation");
    }

    #[test]
    fn normalized_policy_joins_united_states() {
        let mut config = MetricsConfig::default();
        config.reconcile.policy = MatchPolicy::Normalized;

        let profile = build_profile(&handle(), &request("United States", &[2020, 2022]), &config)
            .unwrap();

        assert_eq!(profile.geometry_name, "United States of America");
        assert_eq!(profile.match_kind, MatchKind::Alias);
        assert_eq!(profile.capital_name.as_deref(), Some("Washington"));
        assert_eq!(profile.population_series.len(), 2);
    }

    #[test]
    fn empty_boundary_is_a_geometry_error() {
        let err = build_profile(
            &handle(),
            &request("Nowhere", &[2022]),
            &MetricsConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err, ProfileError::Geometry(GeometryError::Empty));
        assert_eq!(err.stage(), "geometry");
    }

    #[test]
    fn missing_boundary_is_not_found() {
        let err = build_profile(
            &handle(),
            &request("Tuvalu", &[2022]),
            &MetricsConfig::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ProfileError::Reconcile(ReconcileError::NotFound {
                key: "Tuvalu".to_string(),
                side: crate::Side::Geometry,
            })
        );
    }

    #[test]
    fn unknown_stats_year_is_a_stats_error() {
        let mut req = request("France", &[2022]);
        req.stats_year = Year::new(1999);

        let err = build_profile(&handle(), &req, &MetricsConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ProfileError::Stats(StatsError::UnknownYear {
                year: Year::new(1999)
            })
        );
    }

    #[test]
    fn default_request_uses_configured_years() {
        let config = MetricsConfig::default();
        let req = ProfileRequest::with_defaults("France", &config);
        assert_eq!(req.stats_year, Year::new(2022));
        assert_eq!(req.series_years, vec![Year::new(2020), Year::new(2022)]);
    }
}
