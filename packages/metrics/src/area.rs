//! Boundary measurements: area and a map-placement point.

use geo::{Area as _, Centroid as _, InteriorPoint as _, MultiPolygon, Validation as _};
use world_population_metrics_models::{LonLat, PointKind};

use crate::GeometryError;
use crate::projection::AreaProjection;

/// Area of a longitude/latitude boundary in km².
///
/// The boundary is projected with `projection` before measuring, then the
/// planar m² are divided by 1,000,000.
///
/// # Errors
///
/// Returns [`GeometryError`] if the boundary is empty, invalid (including
/// coordinates outside longitude/latitude range), projects to non-finite
/// coordinates, or encloses no area.
pub fn compute_area_km2(
    polygon: &MultiPolygon<f64>,
    projection: AreaProjection,
) -> Result<f64, GeometryError> {
    ensure_lon_lat(polygon)?;
    if !polygon.is_valid() {
        return Err(GeometryError::Invalid {
            reason: "self-intersecting or malformed rings".to_string(),
        });
    }

    let area_m2 = projection.project(polygon).unsigned_area();
    if !area_m2.is_finite() {
        return Err(GeometryError::NonFinite);
    }

    let area_km2 = area_m2 / 1_000_000.0;
    if area_km2 <= 0.0 {
        return Err(GeometryError::ZeroArea);
    }
    Ok(area_km2)
}

/// A point for placing the boundary on a map.
///
/// Uses an interior point, which always lies inside the boundary, and falls
/// back to the centroid only when no interior point can be found.
///
/// # Errors
///
/// Returns [`GeometryError::Empty`] if the boundary has no polygons.
pub fn representative_point(
    polygon: &MultiPolygon<f64>,
) -> Result<(LonLat, PointKind), GeometryError> {
    if is_empty(polygon) {
        return Err(GeometryError::Empty);
    }

    if let Some(point) = polygon.interior_point() {
        return Ok((
            LonLat {
                lon: point.x(),
                lat: point.y(),
            },
            PointKind::Interior,
        ));
    }

    polygon
        .centroid()
        .map(|point| {
            (
                LonLat {
                    lon: point.x(),
                    lat: point.y(),
                },
                PointKind::Centroid,
            )
        })
        .ok_or(GeometryError::Empty)
}

fn is_empty(polygon: &MultiPolygon<f64>) -> bool {
    polygon.0.iter().all(|p| p.exterior().0.is_empty())
}

fn ensure_lon_lat(polygon: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if is_empty(polygon) {
        return Err(GeometryError::Empty);
    }

    let out_of_range = polygon.0.iter().any(|p| {
        std::iter::once(p.exterior())
            .chain(p.interiors())
            .flat_map(|ring| ring.0.iter())
            .any(|c| !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y))
    });
    if out_of_range {
        return Err(GeometryError::Invalid {
            reason: "coordinates are not longitude/latitude degrees".to_string(),
        });
    }
    Ok(())
}
