//! Matching policy and statistics settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use world_population_dataset_models::Year;

use crate::aliases;
use crate::projection::AreaProjection;

/// How population names are matched to boundary names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Identical names only (after trimming surrounding whitespace).
    #[default]
    Exact,
    /// Exact, then alias table, then normalized name, then ISO code.
    Normalized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    pub policy: MatchPolicy,
    /// Population name -> boundary name. Consulted before the built-in
    /// table.
    pub aliases: BTreeMap<String, String>,
    pub builtin_aliases: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::Exact,
            aliases: BTreeMap::new(),
            builtin_aliases: true,
        }
    }
}

impl ReconcileConfig {
    /// The boundary name `population_name` is known under, if any.
    #[must_use]
    pub fn alias_for(&self, population_name: &str) -> Option<&str> {
        self.aliases
            .get(population_name)
            .map(String::as_str)
            .or_else(|| {
                if self.builtin_aliases {
                    aliases::builtin_alias(population_name)
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    /// Year density and world share are computed for.
    pub year: Year,
    /// Series years used when the caller selects none explicitly.
    pub default_series_years: Vec<Year>,
    pub area_projection: AreaProjection,
    /// Relative difference between computed and published area above which
    /// a warning is logged.
    pub area_tolerance: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            year: Year::new(2022),
            default_series_years: vec![Year::new(2020), Year::new(2022)],
            area_projection: AreaProjection::default(),
            area_tolerance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub reconcile: ReconcileConfig,
    pub stats: StatsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_aliases_take_precedence() {
        let config: ReconcileConfig = toml::from_str(
            r#"
            policy = "normalized"

            [aliases]
            "United States" = "USA"
            "#,
        )
        .unwrap();

        assert_eq!(config.policy, MatchPolicy::Normalized);
        assert_eq!(config.alias_for("United States"), Some("USA"));
        assert_eq!(config.alias_for("Tanzania"), Some("United Republic of Tanzania"));
        assert_eq!(config.alias_for("France"), None);
    }

    #[test]
    fn builtin_aliases_can_be_disabled() {
        let config = ReconcileConfig {
            builtin_aliases: false,
            ..ReconcileConfig::default()
        };
        assert_eq!(config.alias_for("United States"), None);
    }

    #[test]
    fn parses_stats_section() {
        let config: StatsConfig = toml::from_str(
            r#"
            year = 2020
            area_projection = "lambert_azimuthal"
            "#,
        )
        .unwrap();

        assert_eq!(config.year, Year::new(2020));
        assert_eq!(config.area_projection, AreaProjection::LambertAzimuthal);
        assert_eq!(
            config.default_series_years,
            vec![Year::new(2020), Year::new(2022)]
        );
    }
}
