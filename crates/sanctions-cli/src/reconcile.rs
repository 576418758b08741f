//! # Reconcile Subcommand
//!
//! Runs one reconciliation pass outside the service schedule.
//!
//! With `--sellers FILE` the pass runs over a JSON array of seller records
//! (`sellMapCenter` as `[lon, lat]`) held in memory; `--write` saves the
//! result back to the same file. Without it, the pass runs against the
//! Postgres database named by `DATABASE_URL`.
//!
//! The reverse geocoder is configured from the `GEOCODER_*` environment
//! variables and the pass from `RECONCILE_*`; flags override the latter.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use sanctions_api::db::PgStore;
use sanctions_api::state::ComplianceStore;
use sanctions_engine::{MemoryStore, PassReport, ReconcileConfig, Reconciler, SellerStore, VerifyMode};
use sanctions_geocoder::{GeocoderClient, GeocoderConfig};
use sanctions_state::SellerRecord;

/// Arguments for `sanctions reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// JSON sellers file. When absent, `DATABASE_URL` is used.
    #[arg(long, value_name = "FILE")]
    pub sellers: Option<PathBuf>,

    /// Write the updated sellers back to `--sellers`.
    #[arg(long, requires = "sellers")]
    pub write: bool,

    /// JSON region catalog (in-memory mode only).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Verification mode: `coarse` or `whole_catalog`.
    #[arg(long)]
    pub mode: Option<VerifyMode>,

    /// Proceed on an empty catalog, restoring every restricted seller.
    #[arg(long)]
    pub allow_empty_catalog: bool,

    /// Print the full pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReconcileArgs {
    fn reconcile_config(&self) -> Result<ReconcileConfig> {
        let mut config = ReconcileConfig::from_env()?;
        if let Some(mode) = self.mode {
            config.verify_mode = mode;
        }
        if self.allow_empty_catalog {
            config.abort_on_empty_catalog = false;
        }
        Ok(config)
    }
}

/// Read a sellers file.
pub fn read_sellers(path: &Path) -> Result<Vec<SellerRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read sellers file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid sellers file {}", path.display()))
}

/// Write a sellers file, replacing it atomically.
pub fn write_sellers(path: &Path, sellers: &[SellerRecord]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(sellers)?)
        .with_context(|| format!("cannot write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("cannot replace {}", path.display()))?;
    Ok(())
}

/// Execute the reconcile subcommand. Exit code 1 means some sellers were
/// left unresolved or unsettled.
pub fn run_reconcile(args: &ReconcileArgs) -> Result<u8> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime.block_on(reconcile(args))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(u8::from(!report.failures.is_empty()))
}

async fn reconcile(args: &ReconcileArgs) -> Result<PassReport> {
    let config = args.reconcile_config()?;
    let geocoder = GeocoderClient::new(
        GeocoderConfig::from_env().context("reverse geocoder is not configured")?,
    )?;

    let store: ComplianceStore = match &args.sellers {
        Some(path) => {
            let store = MemoryStore::with_regions(crate::load_catalog(args.catalog.as_deref())?);
            let sellers = read_sellers(path)?;
            tracing::info!(sellers = sellers.len(), path = %path.display(), "sellers loaded");
            for s in sellers {
                store.insert_seller(s);
            }
            store.into()
        }
        None => match sanctions_api::db::init_pool().await? {
            Some(pool) => PgStore::new(pool).into(),
            None => bail!("either --sellers or DATABASE_URL is required"),
        },
    };

    let reconciler = Reconciler::new(store.clone(), geocoder, config);
    let report = reconciler.run_pass().await?;

    if args.write {
        if let Some(path) = &args.sellers {
            let sellers = store.list_all().await?;
            write_sellers(path, &sellers)?;
            tracing::info!(path = %path.display(), "sellers written");
        }
    }
    Ok(report)
}

fn print_summary(report: &PassReport) {
    println!("run {} ({})", report.run_id, report.verify_mode);
    println!(
        "  regions: {}  candidates: {}  sanctioned: {}  unsanctioned: {}  unresolved: {}",
        report.regions,
        report.candidates,
        report.sanctioned.len(),
        report.unsanctioned,
        report.unresolved
    );
    for m in &report.sanctioned {
        println!("  RESTRICT {} ({}: {})", m.seller_id, m.jurisdiction, m.place_name);
    }
    for f in &report.failures {
        println!("  FAIL {}: {}", f.seller_id, f.reason);
    }
}
