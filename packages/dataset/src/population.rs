//! Population CSV parsing.
//!
//! Both raw shapes the dataset is published in are converted into the same
//! table:
//!
//! * **wide** — one row per country, one `"<year> Population"` column per
//!   year;
//! * **long** — one row per `(country, year)`, with a `Year` column holding
//!   `2022` or `"2022 Population"` and a `Population` column.
//!
//! Each record then holds its own slice of the long form as a
//! year-ordered map; [`PopulationTable::observations`] flattens it back out.

use std::collections::{BTreeMap, BTreeSet};

use csv::StringRecord;
use world_population_dataset_models::{PopulationRecord, PopulationTable, Year};

use crate::config::{PopulationLayout, PopulationSourceConfig};
use crate::fetch::fingerprint;
use crate::LoadError;

/// Resolved header positions shared by both layouts.
struct Columns {
    key: usize,
    area: usize,
    density: usize,
    growth_rate: usize,
    world_percentage: usize,
    rank: Option<usize>,
    code: Option<usize>,
    capital: Option<usize>,
    continent: Option<usize>,
}

/// Cell-level parsing context for one source.
struct RowParser<'a> {
    source_id: &'a str,
    headers: &'a StringRecord,
}

/// Parses and validates the population CSV.
///
/// # Errors
///
/// Returns [`LoadError`] if the bytes are not valid CSV, a required column is
/// missing, a cell is invalid, or a record does not carry exactly the
/// configured years.
pub fn parse_population_csv(
    bytes: &[u8],
    config: &PopulationSourceConfig,
) -> Result<PopulationTable, LoadError> {
    let source_id = config.source.source_id();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let parser = RowParser {
        source_id: &source_id,
        headers: &headers,
    };
    let columns = parser.columns(config)?;
    let years: BTreeSet<Year> = config.years.iter().copied().collect();

    let records = match config.layout {
        PopulationLayout::Wide => parse_wide(&mut reader, &parser, &columns, config, &years)?,
        PopulationLayout::Long => parse_long(&mut reader, &parser, &columns, config, &years)?,
    };

    if records.is_empty() {
        log::warn!("Population table from {source_id} has no records");
    } else {
        log::info!(
            "Parsed {} population records ({} years) from {source_id}",
            records.len(),
            years.len()
        );
    }

    Ok(PopulationTable::new(
        fingerprint(&config.source, bytes),
        years,
        records,
    ))
}

fn parse_wide(
    reader: &mut csv::Reader<&[u8]>,
    parser: &RowParser<'_>,
    columns: &Columns,
    config: &PopulationSourceConfig,
    years: &BTreeSet<Year>,
) -> Result<Vec<PopulationRecord>, LoadError> {
    let year_columns = years
        .iter()
        .map(|year| {
            let name = format!("{year}{}", config.year_column_suffix);
            parser.require(&name).map(|idx| (*year, idx))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = i + 1;
        let mut record = parser.record(&row, row_number, columns)?;
        for (year, idx) in &year_columns {
            let population = parser.count(&row, row_number, *idx)?;
            record.populations.insert(*year, population);
        }
        records.push(record);
    }

    Ok(records)
}

fn parse_long(
    reader: &mut csv::Reader<&[u8]>,
    parser: &RowParser<'_>,
    columns: &Columns,
    config: &PopulationSourceConfig,
    years: &BTreeSet<Year>,
) -> Result<Vec<PopulationRecord>, LoadError> {
    let year_idx = parser.require(&config.year_column)?;
    let population_idx = parser.require(&config.population_column)?;

    let mut records: Vec<PopulationRecord> = Vec::new();
    let mut index_by_name: BTreeMap<String, usize> = BTreeMap::new();

    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = i + 1;
        let parsed = parser.record(&row, row_number, columns)?;

        let raw_year = row.get(year_idx).unwrap_or("");
        let year: Year = raw_year
            .parse()
            .map_err(|_| parser.invalid(row_number, year_idx, raw_year, "not a year"))?;
        if !years.contains(&year) {
            log::debug!(
                "{}: row {row_number}: skipping year {year} outside the configured set",
                parser.source_id
            );
            continue;
        }
        let population = parser.count(&row, row_number, population_idx)?;

        let idx = if let Some(idx) = index_by_name.get(&parsed.country_name) {
            let existing = &records[*idx];
            if !same_precomputed(existing, &parsed) {
                log::warn!(
                    "{}: row {row_number}: precomputed fields for '{}' differ from its first row, keeping the first",
                    parser.source_id,
                    parsed.country_name
                );
            }
            *idx
        } else {
            index_by_name.insert(parsed.country_name.clone(), records.len());
            records.push(parsed);
            records.len() - 1
        };

        let record = &mut records[idx];
        if record.populations.insert(year, population).is_some() {
            return Err(LoadError::InconsistentYears {
                source_id: parser.source_id.to_string(),
                country: record.country_name.clone(),
                message: format!("has more than one row for {year}"),
            });
        }
    }

    for record in &records {
        let have: BTreeSet<Year> = record.years().collect();
        if have != *years {
            let missing: Vec<String> = years.difference(&have).map(ToString::to_string).collect();
            return Err(LoadError::InconsistentYears {
                source_id: parser.source_id.to_string(),
                country: record.country_name.clone(),
                message: format!("is missing years {}", missing.join(", ")),
            });
        }
    }

    Ok(records)
}

fn same_precomputed(a: &PopulationRecord, b: &PopulationRecord) -> bool {
    #[allow(clippy::float_cmp)]
    let same = a.area_km2 == b.area_km2
        && a.density_per_km2 == b.density_per_km2
        && a.growth_rate == b.growth_rate
        && a.world_population_percentage == b.world_population_percentage;
    same
}

impl RowParser<'_> {
    fn find(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize, LoadError> {
        self.find(name).ok_or_else(|| LoadError::MissingField {
            source_id: self.source_id.to_string(),
            field: name.to_string(),
        })
    }

    fn optional(&self, name: Option<&String>) -> Option<usize> {
        name.and_then(|n| self.find(n))
    }

    fn columns(&self, config: &PopulationSourceConfig) -> Result<Columns, LoadError> {
        Ok(Columns {
            key: self.require(&config.key_column)?,
            area: self.require(&config.area_column)?,
            density: self.require(&config.density_column)?,
            growth_rate: self.require(&config.growth_rate_column)?,
            world_percentage: self.require(&config.world_percentage_column)?,
            rank: self.optional(config.rank_column.as_ref()),
            code: self.optional(config.code_column.as_ref()),
            capital: self.optional(config.capital_column.as_ref()),
            continent: self.optional(config.continent_column.as_ref()),
        })
    }

    fn invalid(&self, row: usize, idx: usize, value: &str, reason: &'static str) -> LoadError {
        LoadError::InvalidValue {
            source_id: self.source_id.to_string(),
            row,
            field: self.headers.get(idx).unwrap_or("").to_string(),
            value: value.to_string(),
            reason,
        }
    }

    /// Everything but the per-year populations.
    fn record(
        &self,
        row: &StringRecord,
        row_number: usize,
        columns: &Columns,
    ) -> Result<PopulationRecord, LoadError> {
        let name = row.get(columns.key).unwrap_or("");
        if name.is_empty() {
            return Err(self.invalid(row_number, columns.key, name, "empty key"));
        }

        let area_km2 = self.float(row, row_number, columns.area)?;
        if area_km2 <= 0.0 {
            return Err(self.invalid(
                row_number,
                columns.area,
                row.get(columns.area).unwrap_or(""),
                "area must be positive",
            ));
        }
        let density_per_km2 = self.float(row, row_number, columns.density)?;
        if density_per_km2 < 0.0 {
            return Err(self.invalid(
                row_number,
                columns.density,
                row.get(columns.density).unwrap_or(""),
                "density must not be negative",
            ));
        }
        let world_population_percentage = self.float(row, row_number, columns.world_percentage)?;
        if !(0.0..=100.0).contains(&world_population_percentage) {
            return Err(self.invalid(
                row_number,
                columns.world_percentage,
                row.get(columns.world_percentage).unwrap_or(""),
                "percentage must be within 0-100",
            ));
        }

        let rank = match columns.rank {
            Some(idx) => match row.get(idx).unwrap_or("") {
                "" => None,
                raw => Some(
                    raw.parse::<u32>()
                        .map_err(|_| self.invalid(row_number, idx, raw, "not a rank"))?,
                ),
            },
            None => None,
        };

        Ok(PopulationRecord {
            country_name: name.to_string(),
            populations: BTreeMap::new(),
            area_km2,
            density_per_km2,
            growth_rate: self.float(row, row_number, columns.growth_rate)?,
            world_population_percentage,
            rank,
            cca3: text(row, columns.code),
            capital: text(row, columns.capital),
            continent: text(row, columns.continent),
        })
    }

    fn float(&self, row: &StringRecord, row_number: usize, idx: usize) -> Result<f64, LoadError> {
        let raw = row.get(idx).unwrap_or("");
        let value: f64 = raw
            .parse()
            .map_err(|_| self.invalid(row_number, idx, raw, "not a number"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(row_number, idx, raw, "not finite"))
        }
    }

    /// A non-negative head count. Accepts integral floats such as
    /// `"64756584.0"`, which spreadsheet exports commonly produce.
    fn count(&self, row: &StringRecord, row_number: usize, idx: usize) -> Result<u64, LoadError> {
        let raw = row.get(idx).unwrap_or("");
        if let Ok(value) = raw.parse::<u64>() {
            return Ok(value);
        }
        match raw.parse::<f64>() {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            Ok(value)
                if value.is_finite()
                    && value >= 0.0
                    && value.fract() == 0.0
                    && value <= u64::MAX as f64 =>
            {
                Ok(value as u64)
            }
            Ok(_) => Err(self.invalid(row_number, idx, raw, "not a non-negative integer")),
            Err(_) => Err(self.invalid(row_number, idx, raw, "not a number")),
        }
    }
}

fn text(row: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSource;
    use crate::LoadErrorKind;

    const WIDE: &str = "\
Rank,CCA3,Country/Territory,Capital,Continent,2022 Population,2020 Population,2015 Population,2010 Population,2000 Population,1990 Population,1980 Population,1970 Population,Area (km²),Density (per km²),Growth Rate,World Population Percentage
23,FRA,France,Paris,Europe,64756584,64480053,63809769,62444567,58665453,56412897,53713830,50523586,551695,117.3767,1.0015,0.81
71,CHE,Switzerland,Bern,Europe,8740472,8638167,8281732,7822435,7182059,6711693,6319113,6181227,41284,211.7157,1.0073,0.11
";

    fn config(layout: PopulationLayout) -> PopulationSourceConfig {
        PopulationSourceConfig {
            source: DataSource::Path("world_population.csv".into()),
            layout,
            ..PopulationSourceConfig::default()
        }
    }

    #[test]
    fn parses_wide_layout() {
        let table = parse_population_csv(WIDE.as_bytes(), &config(PopulationLayout::Wide)).unwrap();

        assert_eq!(table.len(), 2);
        let france = &table.records()[0];
        assert_eq!(france.country_name, "France");
        assert_eq!(france.population(Year::new(2022)), Some(64_756_584));
        assert_eq!(france.population(Year::new(1970)), Some(50_523_586));
        assert_eq!(france.cca3.as_deref(), Some("FRA"));
        assert_eq!(france.capital.as_deref(), Some("Paris"));
        assert_eq!(france.rank, Some(23));
        assert!((france.area_km2 - 551_695.0).abs() < f64::EPSILON);
        assert_eq!(table.years().len(), 8);
        assert_eq!(
            table.world_total(Year::new(2022)),
            Some(64_756_584 + 8_740_472)
        );
        assert_eq!(table.fingerprint().source_id, "world_population.csv");
    }

    #[test]
    fn long_layout_matches_wide_layout() {
        let mut long = String::from(
            "Country/Territory,Year,Population,Area (km²),Density (per km²),Growth Rate,World Population Percentage\n",
        );
        for (name, pops, rest) in [
            (
                "France",
                [
                    64_756_584_u64,
                    64_480_053,
                    63_809_769,
                    62_444_567,
                    58_665_453,
                    56_412_897,
                    53_713_830,
                    50_523_586,
                ],
                "551695,117.3767,1.0015,0.81",
            ),
            (
                "Switzerland",
                [
                    8_740_472, 8_638_167, 8_281_732, 7_822_435, 7_182_059, 6_711_693, 6_319_113,
                    6_181_227,
                ],
                "41284,211.7157,1.0073,0.11",
            ),
        ] {
            for (year, pop) in [2022, 2020, 2015, 2010, 2000, 1990, 1980, 1970]
                .iter()
                .zip(pops)
            {
                long.push_str(&format!("{name},{year} Population,{pop},{rest}\n"));
            }
        }

        let wide = parse_population_csv(WIDE.as_bytes(), &config(PopulationLayout::Wide)).unwrap();
        let long = parse_population_csv(long.as_bytes(), &config(PopulationLayout::Long)).unwrap();

        assert_eq!(wide.years(), long.years());
        assert_eq!(
            wide.observations().collect::<Vec<_>>(),
            long.observations().collect::<Vec<_>>()
        );
        assert_eq!(
            wide.world_total(Year::new(1990)),
            long.world_total(Year::new(1990))
        );
    }

    #[test]
    fn long_layout_requires_every_year() {
        let csv = "\
Country/Territory,Year,Population,Area (km²),Density (per km²),Growth Rate,World Population Percentage
France,2022,64756584,551695,117.3767,1.0015,0.81
";
        let err = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Long)).unwrap_err();
        assert!(matches!(err, LoadError::InconsistentYears { .. }));
        assert_eq!(err.kind(), LoadErrorKind::Schema);
    }

    #[test]
    fn missing_year_column_is_schema_error() {
        let csv = WIDE.replace("1980 Population", "1980 Pop");
        let err = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Wide)).unwrap_err();
        match &err {
            LoadError::MissingField { field, .. } => assert_eq!(field, "1980 Population"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), LoadErrorKind::Schema);
    }

    #[test]
    fn missing_key_column_is_schema_error() {
        let csv = WIDE.replace("Country/Territory", "Country");
        let err = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Wide)).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Schema);
    }

    #[test]
    fn negative_population_is_rejected() {
        let csv = WIDE.replace("64756584", "-5");
        let err = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Wide)).unwrap_err();
        match err {
            LoadError::InvalidValue { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "2022 Population");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_integral_float_populations() {
        let csv = WIDE.replace("64756584", "64756584.0");
        let table = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Wide)).unwrap();
        assert_eq!(
            table.records()[0].population(Year::new(2022)),
            Some(64_756_584)
        );
    }

    #[test]
    fn ragged_rows_are_fetch_errors() {
        let csv = format!("{WIDE}Nowhere,1,2\n");
        let err = parse_population_csv(csv.as_bytes(), &config(PopulationLayout::Wide)).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Fetch);
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let header = WIDE.lines().next().unwrap();
        let table =
            parse_population_csv(header.as_bytes(), &config(PopulationLayout::Wide)).unwrap();
        assert!(table.is_empty());
    }
}
