//! # Error Hierarchy
//!
//! Structured validation errors for the domain primitives, built with
//! `thiserror`. Each variant carries the offending input so that operators
//! can diagnose a bad catalog file or a bad request without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Latitude outside [-90, 90] or not a finite number.
    #[error("invalid latitude: {0} (expected a finite number in [-90, 90])")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not a finite number.
    #[error("invalid longitude: {0} (expected a finite number in [-180, 180])")]
    InvalidLongitude(f64),

    /// Seller identifier is empty or whitespace-only.
    #[error("seller id must not be empty")]
    EmptySellerId,

    /// Jurisdiction name does not belong to the closed sanctioned set.
    #[error("unknown jurisdiction: \"{0}\"")]
    UnknownJurisdiction(String),
}

/// Errors raised while building or validating a boundary geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A ring has fewer than four positions (three distinct + closing).
    #[error("ring has {0} positions; at least 4 are required")]
    TooFewPositions(usize),

    /// The first and last positions of a ring differ.
    #[error("ring is not closed: first position {first:?} != last position {last:?}")]
    NotClosed {
        /// First position as (lon, lat).
        first: (f64, f64),
        /// Last position as (lon, lat).
        last: (f64, f64),
    },

    /// Two non-adjacent edges of a ring cross each other.
    #[error("ring self-intersects between edge {a} and edge {b}")]
    SelfIntersection {
        /// Index of the first offending edge.
        a: usize,
        /// Index of the second offending edge.
        b: usize,
    },

    /// A polygon was built with no rings at all.
    #[error("polygon has no exterior ring")]
    EmptyPolygon,

    /// A multipolygon was built with no member polygons.
    #[error("multipolygon has no member polygons")]
    EmptyMultiPolygon,

    /// A position failed coordinate range validation.
    #[error("invalid position: {0}")]
    InvalidPosition(#[from] ValidationError),
}
