//! # Sanctioned Regions
//!
//! A [`SanctionedRegion`] pairs a [`Jurisdiction`] with its geofence. The
//! catalog of regions is read-only to the engine; it is seeded or
//! administered out of band.

use serde::{Deserialize, Serialize};

use crate::geometry::{Boundary, GeoPoint};
use crate::jurisdiction::Jurisdiction;

/// A sanctioned jurisdiction and its boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionedRegion {
    /// The jurisdiction this boundary belongs to.
    pub location: Jurisdiction,
    /// The geofence, in (lon, lat) order.
    pub boundary: Boundary,
}

impl SanctionedRegion {
    /// Create a region.
    pub fn new(location: Jurisdiction, boundary: Boundary) -> Self {
        Self { location, boundary }
    }

    /// Whether the point is inside or on this region's boundary.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.boundary.intersects(point)
    }

    /// Lightweight description for listing endpoints and logs.
    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            location: self.location,
            geometry_type: self.boundary.kind().to_string(),
            polygon_count: self.boundary.polygons().len(),
            vertex_count: self
                .boundary
                .polygons()
                .iter()
                .map(|p| p.exterior().positions().len() - 1)
                .sum(),
        }
    }
}

/// Summary of a cataloged region, without coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Jurisdiction.
    pub location: Jurisdiction,
    /// `Polygon` or `MultiPolygon`.
    pub geometry_type: String,
    /// Number of member polygons.
    pub polygon_count: usize,
    /// Distinct exterior vertices across members.
    pub vertex_count: usize,
}

/// Sort regions into catalog order (jurisdiction declaration order).
pub fn sort_catalog(regions: &mut [SanctionedRegion]) {
    regions.sort_by_key(|r| r.location);
}
