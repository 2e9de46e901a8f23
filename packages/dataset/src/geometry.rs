//! Boundary `GeoJSON` parsing.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use geojson::{Feature, GeoJson};
use world_population_dataset_models::{CountryGeometry, GeometryTable};

use crate::config::GeometrySourceConfig;
use crate::fetch::fingerprint;
use crate::LoadError;

/// Parses and validates the boundary `GeoJSON`.
///
/// Features with a non-areal geometry load with an empty multi-polygon so
/// that the failure surfaces when that country's area is requested rather
/// than aborting the whole table.
///
/// # Errors
///
/// Returns [`LoadError`] if the bytes are not a `GeoJSON` feature collection,
/// or a feature lacks its key property or geometry.
pub fn parse_geometry_geojson(
    bytes: &[u8],
    config: &GeometrySourceConfig,
) -> Result<GeometryTable, LoadError> {
    let source_id = config.source.source_id();
    let geojson: GeoJson = std::str::from_utf8(bytes)?.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => return Err(LoadError::NotAFeatureCollection { source_id }),
    };

    let mut geometries = Vec::with_capacity(features.len());
    for (i, feature) in features.into_iter().enumerate() {
        geometries.push(parse_feature(feature, i + 1, config, &source_id)?);
    }

    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for geometry in &geometries {
        *name_counts.entry(geometry.name.as_str()).or_default() += 1;
    }
    for (name, count) in name_counts.iter().filter(|(_, count)| **count > 1) {
        log::warn!("{source_id}: {count} boundaries share the name '{name}'; the first wins");
    }

    if geometries.is_empty() {
        log::warn!("Boundary table from {source_id} has no features");
    } else {
        log::info!("Parsed {} boundaries from {source_id}", geometries.len());
    }

    Ok(GeometryTable::new(fingerprint(&config.source, bytes), geometries))
}

fn parse_feature(
    mut feature: Feature,
    number: usize,
    config: &GeometrySourceConfig,
    source_id: &str,
) -> Result<CountryGeometry, LoadError> {
    let name = match feature.property(&config.key_property) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(other) => {
            return Err(LoadError::InvalidValue {
                source_id: source_id.to_string(),
                row: number,
                field: config.key_property.clone(),
                value: other.to_string(),
                reason: "not a non-empty string",
            });
        }
        None => {
            return Err(LoadError::MissingField {
                source_id: source_id.to_string(),
                field: config.key_property.clone(),
            });
        }
    };

    let capital_name = config
        .capital_property
        .as_deref()
        .and_then(|key| string_property(&feature, key));

    // `id` is frequently a feature member rather than a property.
    let code = config.code_property.as_deref().and_then(|key| {
        string_property(&feature, key).or_else(|| match (&feature.id, key) {
            (Some(geojson::feature::Id::String(id)), "id") => Some(id.clone()),
            _ => None,
        })
    });

    let Some(geometry) = feature.geometry.take() else {
        return Err(LoadError::MissingGeometry {
            source_id: source_id.to_string(),
            feature: number,
        });
    };

    let polygon = match geo::Geometry::<f64>::try_from(geometry)? {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        geo::Geometry::GeometryCollection(collection) => MultiPolygon(
            collection
                .into_iter()
                .flat_map(|g| match g {
                    geo::Geometry::Polygon(p) => vec![p],
                    geo::Geometry::MultiPolygon(mp) => mp.0,
                    _ => Vec::new(),
                })
                .collect(),
        ),
        other => {
            log::warn!(
                "{source_id}: feature {number} ('{name}') has non-areal geometry {}; loading it empty",
                geometry_type(&other)
            );
            MultiPolygon(Vec::new())
        }
    };

    Ok(CountryGeometry {
        name,
        polygon,
        capital_name,
        code,
    })
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

const fn geometry_type(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSource;
    use crate::LoadErrorKind;

    fn config() -> GeometrySourceConfig {
        GeometrySourceConfig {
            source: DataSource::Path("world.geojson".into()),
            ..GeometrySourceConfig::default()
        }
    }

    fn collection(features: &serde_json::Value) -> Vec<u8> {
        serde_json::json!({ "type": "FeatureCollection", "features": features })
            .to_string()
            .into_bytes()
    }

    fn square_feature(properties: &serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "id": "FRA",
            "properties": properties,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        })
    }

    #[test]
    fn parses_polygon_features() {
        let bytes = collection(&serde_json::json!([square_feature(
            &serde_json::json!({ "name": "France", "Capital": "Paris" })
        )]));
        let table = parse_geometry_geojson(&bytes, &config()).unwrap();

        assert_eq!(table.len(), 1);
        let france = &table.geometries()[0];
        assert_eq!(france.name, "France");
        assert_eq!(france.capital_name.as_deref(), Some("Paris"));
        assert_eq!(france.code.as_deref(), Some("FRA"));
        assert_eq!(france.polygon.0.len(), 1);
    }

    #[test]
    fn keeps_multipolygons() {
        let bytes = collection(&serde_json::json!([{
            "type": "Feature",
            "properties": { "name": "Islands" },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                ]
            }
        }]));
        let table = parse_geometry_geojson(&bytes, &config()).unwrap();
        assert_eq!(table.geometries()[0].polygon.0.len(), 2);
        assert_eq!(table.geometries()[0].capital_name, None);
    }

    #[test]
    fn point_geometry_loads_empty() {
        let bytes = collection(&serde_json::json!([{
            "type": "Feature",
            "properties": { "name": "Dot" },
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
        }]));
        let table = parse_geometry_geojson(&bytes, &config()).unwrap();
        assert!(table.geometries()[0].polygon.0.is_empty());
    }

    #[test]
    fn missing_key_property_is_schema_error() {
        let bytes = collection(&serde_json::json!([square_feature(
            &serde_json::json!({ "ADMIN": "France" })
        )]));
        let err = parse_geometry_geojson(&bytes, &config()).unwrap_err();
        assert!(matches!(err, LoadError::MissingField { ref field, .. } if field == "name"));
        assert_eq!(err.kind(), LoadErrorKind::Schema);
    }

    #[test]
    fn missing_geometry_is_schema_error() {
        let bytes = collection(&serde_json::json!([{
            "type": "Feature",
            "properties": { "name": "Nowhere" },
            "geometry": null
        }]));
        let err = parse_geometry_geojson(&bytes, &config()).unwrap_err();
        assert!(matches!(err, LoadError::MissingGeometry { feature: 1, .. }));
    }

    #[test]
    fn malformed_json_is_fetch_error() {
        let err = parse_geometry_geojson(b"{\"type\": \"FeatureColl", &config()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Fetch);
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let bytes = br#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        let err = parse_geometry_geojson(bytes, &config()).unwrap_err();
        assert!(matches!(err, LoadError::NotAFeatureCollection { .. }));
    }

    #[test]
    fn empty_collection_is_an_empty_table() {
        let bytes = collection(&serde_json::json!([]));
        let table = parse_geometry_geojson(&bytes, &config()).unwrap();
        assert!(table.is_empty());
    }
}
