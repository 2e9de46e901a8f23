//! Equal-area projections of longitude/latitude boundaries.
//!
//! Planar area computed directly on degrees is meaningless, so boundaries
//! are projected onto the authalic sphere's equal-area plane first. Both
//! projections preserve area exactly on the sphere; they differ only in how
//! much they bend the straight edges between vertices.

use geo::{BoundingRect as _, Coord, MapCoords as _, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Radius of the sphere with the same surface area as the WGS84 ellipsoid,
/// in meters.
pub const AUTHALIC_RADIUS_M: f64 = 6_371_007.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaProjection {
    /// Lambert cylindrical equal-area (`x = Rλ`, `y = R sin φ`).
    #[default]
    LambertCylindrical,
    /// Lambert azimuthal equal-area centered on the boundary's bounding
    /// box. Less edge distortion for high-latitude countries.
    LambertAzimuthal,
}

impl AreaProjection {
    /// Projects a boundary in degrees into meters on the equal-area plane.
    #[must_use]
    pub fn project(self, polygon: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Self::LambertCylindrical => polygon.map_coords(cylindrical),
            Self::LambertAzimuthal => {
                let center = polygon
                    .bounding_rect()
                    .map_or(Coord { x: 0.0, y: 0.0 }, |rect| rect.center());
                polygon.map_coords(move |c| azimuthal(c, center))
            }
        }
    }
}

fn cylindrical(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: AUTHALIC_RADIUS_M * c.x.to_radians(),
        y: AUTHALIC_RADIUS_M * c.y.to_radians().sin(),
    }
}

/// Non-finite at the antipode of `center`.
fn azimuthal(c: Coord<f64>, center: Coord<f64>) -> Coord<f64> {
    let (lambda, phi) = (c.x.to_radians(), c.y.to_radians());
    let (lambda0, phi1) = (center.x.to_radians(), center.y.to_radians());
    let dl = lambda - lambda0;

    let k = (2.0 / (1.0 + phi1.sin().mul_add(phi.sin(), phi1.cos() * phi.cos() * dl.cos())))
        .sqrt();

    Coord {
        x: AUTHALIC_RADIUS_M * k * phi.cos() * dl.sin(),
        y: AUTHALIC_RADIUS_M
            * k
            * phi1
                .cos()
                .mul_add(phi.sin(), -(phi1.sin() * phi.cos() * dl.cos())),
    }
}
