//! # Regions Subcommand
//!
//! Lists the region catalog in catalog order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sanctions_core::RegionSummary;

/// Arguments for `sanctions regions`.
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// JSON region catalog to use instead of the built-in one.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the summaries as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the regions subcommand.
pub fn run_regions(args: &RegionsArgs) -> Result<u8> {
    let summaries: Vec<RegionSummary> = crate::load_catalog(args.catalog.as_deref())?
        .iter()
        .map(|r| r.summary())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(0);
    }

    println!("{:<12} {:<13} {:>8} {:>8}", "LOCATION", "GEOMETRY", "POLYGONS", "VERTICES");
    for s in &summaries {
        println!(
            "{:<12} {:<13} {:>8} {:>8}",
            s.location.as_str(),
            s.geometry_type,
            s.polygon_count,
            s.vertex_count
        );
    }
    println!("\n{} region(s)", summaries.len());
    Ok(0)
}
