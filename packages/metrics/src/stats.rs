//! Density, share of world population and time series.

use std::collections::BTreeSet;

use world_population_dataset_models::{PopulationRecord, Year};
use world_population_metrics_models::{SeriesPoint, Stats};

use crate::StatsError;

/// Derives the statistics of `record` for `year`.
///
/// `world_total_for_year` must be the sum of `year`'s population over every
/// record of the full table, not just the matched ones.
///
/// # Errors
///
/// Returns [`StatsError::UnknownYear`] if the record has no population for
/// `year`, and [`StatsError::DivisionByZero`] if `area_km2` or the world
/// total is not positive.
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(
    record: &PopulationRecord,
    area_km2: f64,
    world_total_for_year: u64,
    year: Year,
) -> Result<Stats, StatsError> {
    let population = record
        .population(year)
        .ok_or(StatsError::UnknownYear { year })?;

    if !area_km2.is_finite() || area_km2 <= 0.0 {
        return Err(StatsError::DivisionByZero { what: "area" });
    }
    if world_total_for_year == 0 {
        return Err(StatsError::DivisionByZero {
            what: "world population",
        });
    }

    Ok(Stats {
        year,
        population,
        area_km2,
        density_per_km2: population as f64 / area_km2,
        world_population_percentage: 100.0 * population as f64 / world_total_for_year as f64,
    })
}

/// The record's populations for `years`, ascending by year.
///
/// Input order and duplicates are ignored. Years the record does not carry
/// are skipped, and no years selected yields an empty series.
#[must_use]
pub fn extract_series(record: &PopulationRecord, years: &[Year]) -> Vec<SeriesPoint> {
    let years: BTreeSet<Year> = years.iter().copied().collect();
    years
        .into_iter()
        .filter_map(|year| {
            record
                .population(year)
                .map(|population| SeriesPoint { year, population })
        })
        .collect()
}
