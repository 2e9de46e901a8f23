#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for world population country profiles.
//!
//! Loads both datasets once per invocation, then answers a single query
//! against the resulting [`DatasetHandle`]. Results are printed to stdout as
//! pretty JSON. A query that fails for the selected country is reported as a
//! labeled failure with a non-zero exit code; a dataset that fails to load
//! aborts with the loader's error.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use world_population_cli_utils::{IndicatifProgress, MultiProgress};
use world_population_dataset::{
    DatasetHandle, LoadError, load_geometry_table, load_population_table,
};
use world_population_dataset_models::{ParseYearError, Year};
use world_population_metrics::{
    MatchPolicy, ProfileError, ProfileRequest, build_profile, coverage, extract_series,
    resolve_record,
};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "world_population", about = "World population country profiles")]
struct Cli {
    /// TOML file overriding the embedded default configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable country names
    Countries,
    /// Print the profile of one country
    Profile {
        /// Country name as listed by `countries`
        country: String,
        /// Comma-separated years for the population series (e.g., "2020,2022")
        #[arg(long)]
        years: Option<String>,
        /// Year density and world share are computed for
        #[arg(long)]
        stats_year: Option<u16>,
        /// How country names are matched to boundary names
        #[arg(long, value_enum)]
        policy: Option<Policy>,
    },
    /// Report which names join between the two datasets
    Coverage {
        /// How country names are matched to boundary names
        #[arg(long, value_enum)]
        policy: Option<Policy>,
    },
    /// Print the population series of one country in ascending year order
    Series {
        /// Country name as listed by `countries`
        country: String,
        /// Comma-separated years (defaults to every year in the table)
        #[arg(long)]
        years: Option<String>,
        /// How country names are matched to population rows
        #[arg(long, value_enum)]
        policy: Option<Policy>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    Exact,
    Normalized,
}

impl From<Policy> for MatchPolicy {
    fn from(value: Policy) -> Self {
        match value {
            Policy::Exact => Self::Exact,
            Policy::Normalized => Self::Normalized,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multi = world_population_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Countries => {
            let handle = load_handle(&config, &multi).await?;
            for name in handle.countries() {
                println!("{name}");
            }
        }
        Commands::Profile {
            country,
            years,
            stats_year,
            policy,
        } => {
            if let Some(policy) = policy {
                config.reconcile.policy = policy.into();
            }
            let metrics = config.metrics();

            let mut request = ProfileRequest::with_defaults(&country, &metrics);
            if let Some(years) = years {
                request.series_years = parse_years(&years)?;
            }
            if let Some(year) = stats_year {
                request.stats_year = Year::new(year);
            }

            let handle = load_handle(&config, &multi).await?;
            warn_on_unknown_years(&handle, &request.series_years);

            match build_profile(&handle, &request, &metrics) {
                Ok(profile) => print_json(&profile)?,
                Err(e) => return Ok(report_failure(&country, &e)),
            }
        }
        Commands::Coverage { policy } => {
            if let Some(policy) = policy {
                config.reconcile.policy = policy.into();
            }
            let handle = load_handle(&config, &multi).await?;
            print_json(&coverage(&handle, &config.reconcile))?;
        }
        Commands::Series {
            country,
            years,
            policy,
        } => {
            let policy = policy.map_or(config.reconcile.policy, MatchPolicy::from);
            let handle = load_handle(&config, &multi).await?;

            let years = match years {
                Some(years) => parse_years(&years)?,
                None => handle.population().years().iter().copied().collect(),
            };
            warn_on_unknown_years(&handle, &years);

            match resolve_record(&country, handle.population(), policy) {
                Ok(record) => print_json(&extract_series(record, &years))?,
                Err(e) => return Ok(report_failure(&country, &e.into())),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads both tables concurrently, each with its own progress bar.
async fn load_handle(
    config: &AppConfig,
    multi: &MultiProgress,
) -> Result<DatasetHandle, LoadError> {
    let dataset = config.dataset();
    let population_progress = IndicatifProgress::download_bar(multi, "Population table");
    let geometry_progress = IndicatifProgress::download_bar(multi, "Country boundaries");

    let (population, geometry) = tokio::try_join!(
        load_population_table(&dataset.population, &population_progress),
        load_geometry_table(&dataset.geometry, &geometry_progress),
    )?;

    Ok(DatasetHandle::from_tables(population, geometry))
}

/// Parses a comma-separated year list. An empty list is allowed.
fn parse_years(list: &str) -> Result<Vec<Year>, ParseYearError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn warn_on_unknown_years(handle: &DatasetHandle, years: &[Year]) {
    for year in years {
        if !handle.population().has_year(*year) {
            log::warn!("Year {year} is not in the population table and will be skipped");
        }
    }
}

fn report_failure(country: &str, error: &ProfileError) -> ExitCode {
    eprintln!("Failed ({}) for '{country}': {error}", error.stage());
    ExitCode::FAILURE
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
