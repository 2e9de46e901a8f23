#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciliation and metrics for world population country profiles.
//!
//! Joins a population row to its country boundary by name (the two datasets
//! do not agree on names), computes the boundary's area on an equal-area
//! projection, and derives density, share of world population and a
//! population time series. Every per-country failure is returned as a typed
//! error; nothing is coerced into a default number.

pub mod aliases;
pub mod area;
pub mod config;
pub mod normalize;
pub mod profile;
pub mod projection;
pub mod reconcile;
pub mod stats;

use std::fmt;

use thiserror::Error;
use world_population_dataset_models::Year;

pub use area::{compute_area_km2, representative_point};
pub use config::{MatchPolicy, MetricsConfig, ReconcileConfig, StatsConfig};
pub use profile::{ProfileRequest, build_profile};
pub use projection::AreaProjection;
pub use reconcile::{Resolution, coverage, resolve, resolve_record};
pub use stats::{compute_stats, extract_series};

/// Which table a lookup missed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Population,
    Geometry,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Population => "population",
            Self::Geometry => "boundary",
        })
    }
}

/// Errors that can occur while joining the two tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// No row for the key on one side of the join.
    #[error("'{key}' not found in the {side} table")]
    NotFound {
        /// The name that was looked up.
        key: String,
        side: Side,
    },
}

/// Errors that can occur while measuring a boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The boundary has no polygons.
    #[error("boundary is empty")]
    Empty,

    /// The boundary is not a valid polygon (e.g. self-intersecting), or its
    /// coordinates are not longitude/latitude degrees.
    #[error("boundary is invalid: {reason}")]
    Invalid { reason: String },

    /// The boundary encloses no area.
    #[error("boundary has zero area")]
    ZeroArea,

    /// Projection produced a non-finite coordinate.
    #[error("boundary could not be projected")]
    NonFinite,
}

/// Errors that can occur while deriving statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A divisor was zero, negative or non-finite.
    #[error("division by zero: {what} is not positive")]
    DivisionByZero { what: &'static str },

    /// The year is not one of the table's years.
    #[error("unknown year {year}")]
    UnknownYear { year: Year },
}

/// Any per-country failure while building a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl ProfileError {
    /// Short label of the step that failed, for labeled reporting.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Reconcile(_) => "reconciliation",
            Self::Geometry(_) => "geometry",
            Self::Stats(_) => "statistics",
        }
    }
}
