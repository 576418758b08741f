//! # sanctions CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sanctions_cli::check::{run_check, CheckArgs};
use sanctions_cli::reconcile::{run_reconcile, ReconcileArgs};
use sanctions_cli::regions::{run_regions, RegionsArgs};

/// Sanctioned-region compliance tooling.
#[derive(Parser, Debug)]
#[command(name = "sanctions", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Test whether a point lies in a sanctioned region.
    Check(CheckArgs),

    /// List the region catalog.
    Regions(RegionsArgs),

    /// Run one reconciliation pass.
    Reconcile(ReconcileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Regions(args) => run_regions(&args),
        Commands::Reconcile(args) => run_reconcile(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
