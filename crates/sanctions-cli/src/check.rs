//! # Check Subcommand
//!
//! The fast-path geofence test from the command line. Like the HTTP
//! endpoint, it never calls the reverse geocoder.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sanctions_core::{GeoPoint, Jurisdiction};
use serde::Serialize;

/// Arguments for `sanctions check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// JSON region catalog to use instead of the built-in one.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Result of a point check.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub is_sanctioned: bool,
    /// Every region containing the point, in catalog order.
    pub regions: Vec<Jurisdiction>,
}

/// Evaluate the point against the catalog.
pub fn evaluate(args: &CheckArgs) -> Result<CheckOutput> {
    let point = GeoPoint::from_lat_lon(args.lat, args.lon)?;
    let catalog = crate::load_catalog(args.catalog.as_deref())?;
    let regions: Vec<Jurisdiction> = catalog
        .iter()
        .filter(|r| r.contains(point))
        .map(|r| r.location)
        .collect();
    Ok(CheckOutput {
        is_sanctioned: !regions.is_empty(),
        regions,
    })
}

/// Execute the check subcommand. Exit code 1 means sanctioned.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let output = evaluate(args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if output.is_sanctioned {
        let names: Vec<&str> = output.regions.iter().map(|j| j.as_str()).collect();
        println!("SANCTIONED ({})", names.join(", "));
    } else {
        println!("not sanctioned");
    }

    Ok(u8::from(output.is_sanctioned))
}
