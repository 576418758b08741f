#![deny(missing_docs)]

//! # sanctions-core: Foundational Types for the Sanctions Engine
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies: only `serde`, `serde_json`, and `thiserror` from the
//! external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Coordinates are always (longitude, latitude).** [`GeoPoint`] is the
//!    only way to carry a position, and it is range-checked on construction.
//!    Callers that receive `(lat, lon)` from the outside world must convert
//!    through [`GeoPoint::from_lat_lon`].
//!
//! 2. **Boundaries are validated once.** A [`Boundary`] can only be built from
//!    closed, non-self-intersecting rings. Deserialization goes through the
//!    same validation, so a malformed catalog file never reaches the engine.
//!
//! 3. **Single [`Jurisdiction`] enum.** One closed set of sanctioned
//!    jurisdictions with their place-name variants. Catalog order is the
//!    declaration order and is the deterministic tie-break everywhere.

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod jurisdiction;
pub mod region;
pub mod seller;

pub use catalog::{default_regions, parse_catalog};
pub use error::{GeometryError, ValidationError};
pub use geometry::{Boundary, GeoPoint, Location, Polygon, Ring};
pub use jurisdiction::Jurisdiction;
pub use region::{sort_catalog, RegionSummary, SanctionedRegion};
pub use seller::SellerId;
