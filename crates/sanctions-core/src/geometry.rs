//! # Geofence Geometry
//!
//! Planar point-in-polygon geometry over (longitude, latitude) pairs.
//!
//! The serialized form is GeoJSON-compatible: a [`GeoPoint`] is `[lon, lat]`,
//! a [`Ring`] is an array of points, a [`Polygon`] is an array of rings
//! (exterior first, then holes), and a [`Boundary`] is
//! `{"type": "Polygon" | "MultiPolygon", "coordinates": ...}`. Every level
//! validates on deserialization, so an invalid geometry is unrepresentable.
//!
//! ## Boundary semantics
//!
//! A point lying exactly on an edge is reported as [`Location::Boundary`] and
//! counts as intersecting. This mirrors the "intersects" semantics of the
//! spatial store, where a seller sitting on a border line is a candidate.
//!
//! ## Antimeridian
//!
//! The geometry is planar. A region that crosses the antimeridian must be
//! stored as a multipolygon split at ±180°, never as one polygon spanning
//! the seam.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, ValidationError};

/// Tolerance for collinearity tests.
const EPSILON: f64 = 1e-12;

// ── GeoPoint ────────────────────────────────────────────────────────────

/// A WGS84 position in (longitude, latitude) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    /// Create a point from longitude and latitude.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either coordinate is non-finite or out
    /// of range.
    pub fn new(lon: f64, lat: f64) -> Result<Self, ValidationError> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidLongitude(lon));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidLatitude(lat));
        }
        Ok(Self { lon, lat })
    }

    /// Create a point from the (latitude, longitude) order used by request
    /// bodies and the geocoder API.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        Self::new(lon, lat)
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }
}

impl TryFrom<[f64; 2]> for GeoPoint {
    type Error = ValidationError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// Where a point lies relative to a ring, polygon, or boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside.
    Inside,
    /// On an edge or vertex.
    Boundary,
    /// Strictly outside.
    Outside,
}

impl Location {
    /// Whether the point touches the shape (inside or on its boundary).
    pub fn intersects(&self) -> bool {
        !matches!(self, Self::Outside)
    }
}

// ── Ring ────────────────────────────────────────────────────────────────

/// A closed, simple linear ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct Ring(Vec<GeoPoint>);

impl Ring {
    /// Build a ring, validating closure, minimum size, and simplicity.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::TooFewPositions`] with fewer than four positions.
    /// - [`GeometryError::NotClosed`] when first and last positions differ.
    /// - [`GeometryError::SelfIntersection`] when two non-adjacent edges touch.
    pub fn new(positions: Vec<GeoPoint>) -> Result<Self, GeometryError> {
        if positions.len() < 4 {
            return Err(GeometryError::TooFewPositions(positions.len()));
        }
        let first = positions[0];
        let last = positions[positions.len() - 1];
        if first != last {
            return Err(GeometryError::NotClosed {
                first: (first.lon, first.lat),
                last: (last.lon, last.lat),
            });
        }
        check_simple(&positions)?;
        Ok(Self(positions))
    }

    /// Build a ring from raw `[lon, lat]` pairs.
    pub fn from_coords(coords: &[[f64; 2]]) -> Result<Self, GeometryError> {
        let positions = coords
            .iter()
            .map(|c| GeoPoint::try_from(*c))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(positions)
    }

    /// The ring's positions, first == last.
    pub fn positions(&self) -> &[GeoPoint] {
        &self.0
    }

    /// Locate a point relative to this ring using even-odd ray casting.
    pub fn locate(&self, p: GeoPoint) -> Location {
        let mut inside = false;
        for edge in self.0.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if on_segment(a, b, p) {
                return Location::Boundary;
            }
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let x = a.lon + (p.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
                if p.lon < x {
                    inside = !inside;
                }
            }
        }
        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

impl TryFrom<Vec<GeoPoint>> for Ring {
    type Error = GeometryError;

    fn try_from(value: Vec<GeoPoint>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ring> for Vec<GeoPoint> {
    fn from(r: Ring) -> Self {
        r.0
    }
}

// ── Polygon ─────────────────────────────────────────────────────────────

/// A polygon: one exterior ring followed by zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Ring>", into = "Vec<Ring>")]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    /// Build a polygon from its rings (exterior first).
    pub fn new(rings: Vec<Ring>) -> Result<Self, GeometryError> {
        if rings.is_empty() {
            return Err(GeometryError::EmptyPolygon);
        }
        Ok(Self { rings })
    }

    /// Build a hole-free polygon from raw exterior coordinates.
    pub fn from_exterior(coords: &[[f64; 2]]) -> Result<Self, GeometryError> {
        Self::new(vec![Ring::from_coords(coords)?])
    }

    /// The exterior ring.
    pub fn exterior(&self) -> &Ring {
        &self.rings[0]
    }

    /// Interior rings (holes).
    pub fn holes(&self) -> &[Ring] {
        &self.rings[1..]
    }

    /// Locate a point relative to this polygon. Points inside a hole are outside.
    pub fn locate(&self, p: GeoPoint) -> Location {
        match self.exterior().locate(p) {
            Location::Outside => Location::Outside,
            Location::Boundary => Location::Boundary,
            Location::Inside => {
                for hole in self.holes() {
                    match hole.locate(p) {
                        Location::Inside => return Location::Outside,
                        Location::Boundary => return Location::Boundary,
                        Location::Outside => {}
                    }
                }
                Location::Inside
            }
        }
    }
}

impl TryFrom<Vec<Ring>> for Polygon {
    type Error = GeometryError;

    fn try_from(value: Vec<Ring>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Polygon> for Vec<Ring> {
    fn from(p: Polygon) -> Self {
        p.rings
    }
}

// ── Boundary ────────────────────────────────────────────────────────────

/// A sanctioned-area boundary: a single polygon or a multipolygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundary", into = "RawBoundary")]
pub enum Boundary {
    /// One polygon.
    Polygon(Polygon),
    /// Several disjoint polygons, e.g. a region split at the antimeridian.
    MultiPolygon(Vec<Polygon>),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawBoundary {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl TryFrom<RawBoundary> for Boundary {
    type Error = GeometryError;

    fn try_from(raw: RawBoundary) -> Result<Self, Self::Error> {
        match raw {
            RawBoundary::Polygon(p) => Ok(Self::Polygon(p)),
            RawBoundary::MultiPolygon(ps) => Self::multi(ps),
        }
    }
}

impl From<Boundary> for RawBoundary {
    fn from(b: Boundary) -> Self {
        match b {
            Boundary::Polygon(p) => RawBoundary::Polygon(p),
            Boundary::MultiPolygon(ps) => RawBoundary::MultiPolygon(ps),
        }
    }
}

impl Boundary {
    /// Build a multipolygon boundary.
    pub fn multi(polygons: Vec<Polygon>) -> Result<Self, GeometryError> {
        if polygons.is_empty() {
            return Err(GeometryError::EmptyMultiPolygon);
        }
        Ok(Self::MultiPolygon(polygons))
    }

    /// The GeoJSON geometry type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// All member polygons.
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Polygon(p) => std::slice::from_ref(p),
            Self::MultiPolygon(ps) => ps,
        }
    }

    /// Locate a point. Inside any member wins over boundary, boundary over outside.
    pub fn locate(&self, p: GeoPoint) -> Location {
        let mut best = Location::Outside;
        for polygon in self.polygons() {
            match polygon.locate(p) {
                Location::Inside => return Location::Inside,
                Location::Boundary => best = Location::Boundary,
                Location::Outside => {}
            }
        }
        best
    }

    /// Whether the point is inside or on the boundary.
    pub fn intersects(&self, p: GeoPoint) -> bool {
        self.locate(p).intersects()
    }

    /// GeoJSON geometry value, suitable for `ST_GeomFromGeoJSON`.
    pub fn to_geojson(&self) -> serde_json::Value {
        let coordinates = match self {
            Self::Polygon(p) => polygon_coords(p),
            Self::MultiPolygon(ps) => {
                serde_json::Value::Array(ps.iter().map(polygon_coords).collect())
            }
        };
        serde_json::json!({ "type": self.kind(), "coordinates": coordinates })
    }
}

fn polygon_coords(p: &Polygon) -> serde_json::Value {
    serde_json::Value::Array(
        p.rings
            .iter()
            .map(|r| {
                serde_json::Value::Array(
                    r.positions()
                        .iter()
                        .map(|pt| serde_json::json!([pt.lon, pt.lat]))
                        .collect(),
                )
            })
            .collect(),
    )
}

// ── Segment predicates ──────────────────────────────────────────────────

fn orient(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

fn on_segment(a: GeoPoint, b: GeoPoint, p: GeoPoint) -> bool {
    orient(a, b, p).abs() <= EPSILON
        && p.lon >= a.lon.min(b.lon) - EPSILON
        && p.lon <= a.lon.max(b.lon) + EPSILON
        && p.lat >= a.lat.min(b.lat) - EPSILON
        && p.lat <= a.lat.max(b.lat) + EPSILON
}

fn segments_intersect(a: GeoPoint, b: GeoPoint, c: GeoPoint, d: GeoPoint) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    let straddles = |x: f64, y: f64| (x > EPSILON && y < -EPSILON) || (x < -EPSILON && y > EPSILON);
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }
    on_segment(c, d, a) || on_segment(c, d, b) || on_segment(a, b, c) || on_segment(a, b, d)
}

/// Reject rings whose non-adjacent edges touch or cross.
fn check_simple(positions: &[GeoPoint]) -> Result<(), GeometryError> {
    let edges = positions.len() - 1;
    for i in 0..edges {
        for j in (i + 2)..edges {
            // First and last edges share the closing vertex.
            if i == 0 && j == edges - 1 {
                continue;
            }
            if segments_intersect(positions[i], positions[i + 1], positions[j], positions[j + 1]) {
                return Err(GeometryError::SelfIntersection { a: i, b: j });
            }
        }
    }
    Ok(())
}
