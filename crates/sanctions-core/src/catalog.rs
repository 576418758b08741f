//! # Built-in Region Catalog
//!
//! Coarse geofences for every [`Jurisdiction`]. These are deliberately
//! generous outlines: they act as the first, cheap filter, and the reverse
//! geocoder is the authority that confirms or refutes membership. Border
//! areas therefore overlap neighbouring countries in places.
//!
//! Deployments with a spatial database seed `sanctioned_regions` from the
//! same data (see `sanctions-api` migrations); in-memory deployments may
//! replace it with a JSON file in the [`SanctionedRegion`] serde format.

use crate::error::GeometryError;
use crate::geometry::{Boundary, Polygon};
use crate::jurisdiction::Jurisdiction;
use crate::region::{sort_catalog, SanctionedRegion};

const CUBA: &[[f64; 2]] = &[
    [-85.0, 21.8],
    [-84.0, 23.2],
    [-80.0, 23.3],
    [-77.0, 22.0],
    [-74.1, 20.3],
    [-75.0, 19.8],
    [-77.8, 19.8],
    [-78.5, 21.5],
    [-82.0, 21.6],
    [-85.0, 21.8],
];

const IRAN: &[[f64; 2]] = &[
    [44.0, 39.8],
    [48.0, 39.8],
    [54.0, 37.5],
    [61.0, 36.6],
    [61.6, 31.4],
    [63.3, 25.2],
    [57.0, 25.4],
    [53.0, 26.5],
    [50.0, 29.8],
    [48.5, 29.9],
    [47.5, 32.0],
    [45.5, 33.9],
    [44.0, 37.0],
    [44.0, 39.8],
];

const NORTH_KOREA: &[[f64; 2]] = &[
    [123.0, 37.2],
    [126.0, 37.2],
    [126.6, 37.75],
    [128.4, 38.3],
    [129.5, 39.0],
    [130.9, 42.3],
    [130.0, 43.1],
    [126.0, 42.3],
    [124.3, 40.1],
    [123.0, 39.6],
    [123.0, 37.2],
];

const SYRIA: &[[f64; 2]] = &[
    [35.7, 35.9],
    [36.6, 36.8],
    [42.4, 37.3],
    [41.2, 34.4],
    [38.8, 33.4],
    [36.0, 33.0],
    [35.6, 33.9],
    [35.7, 35.9],
];

const CRIMEA: &[[f64; 2]] = &[
    [32.4, 45.4],
    [33.6, 46.2],
    [34.6, 46.0],
    [36.7, 45.5],
    [36.4, 45.0],
    [35.0, 44.8],
    [33.4, 44.4],
    [32.4, 45.4],
];

const DONETSK: &[[f64; 2]] = &[
    [36.9, 47.0],
    [37.3, 48.6],
    [38.3, 49.1],
    [38.9, 48.2],
    [38.2, 47.1],
    [36.9, 47.0],
];

const LUHANSK: &[[f64; 2]] = &[
    [38.3, 49.1],
    [38.2, 50.1],
    [39.9, 50.0],
    [40.2, 49.4],
    [39.7, 48.6],
    [38.9, 48.2],
    [38.3, 49.1],
];

/// Russia west of the antimeridian.
const RUSSIA_MAIN: &[[f64; 2]] = &[
    [27.3, 57.5],
    [28.0, 59.5],
    [30.0, 69.8],
    [60.0, 77.0],
    [110.0, 78.0],
    [180.0, 72.0],
    [180.0, 64.0],
    [143.0, 44.5],
    [134.0, 42.5],
    [130.5, 42.8],
    [120.0, 53.0],
    [87.0, 49.0],
    [60.0, 50.5],
    [48.0, 46.0],
    [47.0, 42.0],
    [40.0, 43.4],
    [37.5, 47.0],
    [39.5, 49.5],
    [31.8, 52.1],
    [27.3, 57.5],
];

/// Chukotka east of the antimeridian.
const RUSSIA_CHUKOTKA: &[[f64; 2]] = &[
    [-180.0, 64.0],
    [-180.0, 72.0],
    [-168.0, 70.0],
    [-168.5, 65.5],
    [-180.0, 64.0],
];

/// Build the built-in catalog in catalog order.
///
/// # Errors
///
/// Returns [`GeometryError`] if a built-in outline fails validation, which
/// indicates a programming error in the constants above.
pub fn default_regions() -> Result<Vec<SanctionedRegion>, GeometryError> {
    let single = |location: Jurisdiction, coords: &[[f64; 2]]| {
        Polygon::from_exterior(coords).map(|p| SanctionedRegion::new(location, Boundary::Polygon(p)))
    };

    let mut regions = vec![
        single(Jurisdiction::Cuba, CUBA)?,
        single(Jurisdiction::Iran, IRAN)?,
        single(Jurisdiction::NorthKorea, NORTH_KOREA)?,
        single(Jurisdiction::Syria, SYRIA)?,
        single(Jurisdiction::Crimea, CRIMEA)?,
        single(Jurisdiction::Donetsk, DONETSK)?,
        single(Jurisdiction::Luhansk, LUHANSK)?,
        SanctionedRegion::new(
            Jurisdiction::Russia,
            Boundary::multi(vec![
                Polygon::from_exterior(RUSSIA_MAIN)?,
                Polygon::from_exterior(RUSSIA_CHUKOTKA)?,
            ])?,
        ),
    ];
    sort_catalog(&mut regions);
    Ok(regions)
}

/// Parse a catalog from its JSON form (an array of regions) and sort it
/// into catalog order. Geometry is validated during deserialization.
pub fn parse_catalog(json: &str) -> Result<Vec<SanctionedRegion>, serde_json::Error> {
    let mut regions: Vec<SanctionedRegion> = serde_json::from_str(json)?;
    sort_catalog(&mut regions);
    Ok(regions)
}
