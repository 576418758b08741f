//! # sanctions-cli: Operator CLI for the Compliance Engine
//!
//! ## Subcommands
//!
//! - `sanctions check` tests one point against the region catalog.
//! - `sanctions regions` lists the catalog.
//! - `sanctions reconcile` runs one reconciliation pass, either over a JSON
//!   sellers file (written back in place with `--write`) or against the
//!   database named by `DATABASE_URL`.
//!
//! ```bash
//! sanctions check --lat 35.69 --lon 51.39
//! sanctions regions --catalog regions.json
//! GEOCODER_USER_AGENT="acme-compliance/1.0 (ops@acme.test)" \
//!     sanctions reconcile --sellers sellers.json --write
//! ```
//!
//! Exit codes: 0 on success, 1 when a check finds a sanctioned point or a
//! pass leaves sellers unresolved, 2 on operational error.

pub mod check;
pub mod reconcile;
pub mod regions;

use std::path::Path;

use anyhow::{Context, Result};
use sanctions_core::SanctionedRegion;

/// Load the catalog from `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Vec<SanctionedRegion>> {
    sanctions_api::bootstrap::load_catalog(path).context("failed to load region catalog")
}
