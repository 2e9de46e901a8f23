//! Joining population rows to boundaries by country name.
//!
//! Under [`MatchPolicy::Exact`] the join is a plain string comparison and a
//! country whose names differ between the datasets (e.g. "United States"
//! vs "United States of America") is reported as not found.
//! [`MatchPolicy::Normalized`] widens the match through the alias table,
//! name normalization and ISO codes, in that order.
//!
//! When several rows match at the winning step, the first in table order is
//! used and the resolution is flagged ambiguous.

use std::collections::BTreeSet;

use world_population_dataset::DatasetHandle;
use world_population_dataset_models::{
    CountryGeometry, GeometryTable, PopulationRecord, PopulationTable,
};
use world_population_metrics_models::{CoverageReport, MatchKind};

use crate::config::{MatchPolicy, ReconcileConfig};
use crate::normalize::normalize_name;
use crate::{ReconcileError, Side};

/// A population row and the boundary it was joined to.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub record: &'a PopulationRecord,
    pub geometry: &'a CountryGeometry,
    pub match_kind: MatchKind,
    /// More than one row matched on either side; the first was taken.
    pub ambiguous: bool,
}

/// Joins `country_key` across both tables.
///
/// # Errors
///
/// Returns [`ReconcileError::NotFound`] naming the side that has no row for
/// the key.
pub fn resolve<'a>(
    country_key: &str,
    population: &'a PopulationTable,
    geometry: &'a GeometryTable,
    config: &ReconcileConfig,
) -> Result<Resolution<'a>, ReconcileError> {
    let key = country_key.trim();

    let (records, record_kind) = find_records(key, population, config.policy);
    let Some(record) = records.first().copied() else {
        return Err(ReconcileError::NotFound {
            key: key.to_string(),
            side: Side::Population,
        });
    };

    let Some((geometries, geometry_kind)) = find_geometries(record, geometry, config) else {
        return Err(ReconcileError::NotFound {
            key: record.country_name.clone(),
            side: Side::Geometry,
        });
    };

    let ambiguous = records.len() > 1 || geometries.len() > 1;
    if ambiguous {
        log::warn!(
            "'{key}' is ambiguous ({} population rows, {} boundaries); using the first of each",
            records.len(),
            geometries.len()
        );
    }

    Ok(Resolution {
        record,
        geometry: geometries[0],
        match_kind: record_kind.max(geometry_kind),
        ambiguous,
    })
}

/// Finds the population row for `country_key` without joining a boundary.
///
/// # Errors
///
/// Returns [`ReconcileError::NotFound`] if no row matches under `policy`.
pub fn resolve_record<'a>(
    country_key: &str,
    population: &'a PopulationTable,
    policy: MatchPolicy,
) -> Result<&'a PopulationRecord, ReconcileError> {
    let key = country_key.trim();
    let (records, _) = find_records(key, population, policy);
    records
        .first()
        .copied()
        .ok_or_else(|| ReconcileError::NotFound {
            key: key.to_string(),
            side: Side::Population,
        })
}

/// Lists the names that do not join under `config`.
#[must_use]
pub fn coverage(handle: &DatasetHandle, config: &ReconcileConfig) -> CoverageReport {
    let mut report = CoverageReport::default();
    let mut joined: BTreeSet<&str> = BTreeSet::new();

    for name in handle.countries() {
        match resolve(name, handle.population(), handle.geometry(), config) {
            Ok(resolution) => {
                report.matched += 1;
                joined.insert(resolution.geometry.name.as_str());
            }
            Err(_) => report.population_only.push(name.to_string()),
        }
    }

    let geometry_names: BTreeSet<&str> = handle
        .geometry()
        .geometries()
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    report.geometry_only = geometry_names
        .difference(&joined)
        .map(ToString::to_string)
        .collect();

    log::info!(
        "Coverage: {} joined, {} population-only, {} boundary-only",
        report.matched,
        report.population_only.len(),
        report.geometry_only.len()
    );

    report
}

fn find_records<'a>(
    key: &str,
    population: &'a PopulationTable,
    policy: MatchPolicy,
) -> (Vec<&'a PopulationRecord>, MatchKind) {
    let exact = population.matching(key);
    if !exact.is_empty() || policy == MatchPolicy::Exact {
        return (exact, MatchKind::Exact);
    }

    let normalized_key = normalize_name(key);
    let normalized = population
        .records()
        .iter()
        .filter(|r| normalize_name(&r.country_name) == normalized_key)
        .collect();
    (normalized, MatchKind::Normalized)
}

fn find_geometries<'a>(
    record: &PopulationRecord,
    geometry: &'a GeometryTable,
    config: &ReconcileConfig,
) -> Option<(Vec<&'a CountryGeometry>, MatchKind)> {
    let non_empty = |found: Vec<&'a CountryGeometry>| (!found.is_empty()).then_some(found);

    let name = record.country_name.as_str();
    if let Some(found) = non_empty(geometry.matching(name)) {
        return Some((found, MatchKind::Exact));
    }
    if config.policy == MatchPolicy::Exact {
        return None;
    }

    if let Some(alias) = config.alias_for(name)
        && let Some(found) = non_empty(geometry.matching(alias))
    {
        return Some((found, MatchKind::Alias));
    }

    let normalized = normalize_name(name);
    let by_name = geometry
        .geometries()
        .iter()
        .filter(|g| normalize_name(&g.name) == normalized)
        .collect();
    if let Some(found) = non_empty(by_name) {
        return Some((found, MatchKind::Normalized));
    }

    let code = record.cca3.as_deref()?;
    let by_code = geometry
        .geometries()
        .iter()
        .filter(|g| g.code.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code)))
        .collect();
    non_empty(by_code).map(|found| (found, MatchKind::Code))
}
