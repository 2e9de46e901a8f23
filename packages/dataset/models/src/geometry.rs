//! Country boundary table.

use geo::MultiPolygon;

use crate::SourceFingerprint;

/// One territory from the boundary dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryGeometry {
    /// Territory name, the geometry side of the join key.
    pub name: String,
    /// Boundary in longitude/latitude degrees. Empty when the source feature
    /// had a non-areal geometry.
    pub polygon: MultiPolygon<f64>,
    /// Capital city name, when the source carries one.
    pub capital_name: Option<String>,
    /// ISO 3166-1 alpha-3 code, when the source carries one.
    pub code: Option<String>,
}

/// The validated boundary table, in source order.
#[derive(Debug, Clone)]
pub struct GeometryTable {
    fingerprint: SourceFingerprint,
    geometries: Vec<CountryGeometry>,
}

impl GeometryTable {
    #[must_use]
    pub const fn new(fingerprint: SourceFingerprint, geometries: Vec<CountryGeometry>) -> Self {
        Self {
            fingerprint,
            geometries,
        }
    }

    #[must_use]
    pub const fn fingerprint(&self) -> &SourceFingerprint {
        &self.fingerprint
    }

    #[must_use]
    pub fn geometries(&self) -> &[CountryGeometry] {
        &self.geometries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Geometries whose `name` equals `name`, in source order.
    #[must_use]
    pub fn matching(&self, name: &str) -> Vec<&CountryGeometry> {
        self.geometries.iter().filter(|g| g.name == name).collect()
    }
}
