//! # Service Bootstrap
//!
//! Wires the service together from configuration:
//!
//! 1. Load the region catalog (`REGION_CATALOG_PATH` or the built-in one).
//! 2. Select the store: Postgres when a pool is given (seeding an empty
//!    catalog table), otherwise in-memory.
//! 3. Build the reconciliation job when `GEOCODER_USER_AGENT` is set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sanctions_core::{default_regions, parse_catalog, GeometryError, SanctionedRegion};
use sanctions_engine::{MemoryStore, ReconcileConfig, Reconciler, StoreError};
use sanctions_geocoder::{GeocodeError, GeocoderClient, GeocoderConfig};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::PgStore;
use crate::state::{AppConfig, AppState, ComplianceStore};

/// Errors that prevent the service from starting.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("cannot read region catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid region catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("built-in region catalog is invalid: {0}")]
    BuiltinCatalog(#[from] GeometryError),

    #[error("region catalog seeding failed: {0}")]
    Seed(#[from] StoreError),

    #[error("geocoder configuration: {0}")]
    GeocoderConfig(#[from] sanctions_geocoder::ConfigError),

    #[error("geocoder client: {0}")]
    Geocoder(#[from] GeocodeError),

    #[error("reconciliation configuration: {0}")]
    ReconcileConfig(#[from] sanctions_engine::ConfigError),
}

/// Load the catalog from a JSON file, or the built-in catalog when no path
/// is given. The result is in catalog order.
pub fn load_catalog(path: Option<&Path>) -> Result<Vec<SanctionedRegion>, BootstrapError> {
    let Some(path) = path else {
        return Ok(default_regions()?);
    };
    let raw = std::fs::read_to_string(path).map_err(|source| BootstrapError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let regions = parse_catalog(&raw).map_err(|source| BootstrapError::CatalogParse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), regions = regions.len(), "region catalog loaded");
    Ok(regions)
}

/// Build application state from configuration and an optional pool.
pub async fn bootstrap(config: AppConfig, pool: Option<PgPool>) -> Result<AppState, BootstrapError> {
    let catalog = load_catalog(config.catalog_path.as_deref())?;

    let store: ComplianceStore = match pool {
        Some(pool) => {
            let store = PgStore::new(pool);
            store.seed_regions_if_empty(&catalog).await?;
            store.into()
        }
        None => MemoryStore::with_regions(catalog).into(),
    };
    tracing::info!(backend = store.backend(), "store selected");

    let state = AppState::new(config, store.clone());

    if !GeocoderConfig::is_configured() {
        tracing::warn!(
            "GEOCODER_USER_AGENT not set; scheduled and manual reconciliation are disabled"
        );
        return Ok(state);
    }

    let reconcile_config = ReconcileConfig::from_env()?;
    let geocoder = GeocoderClient::new(GeocoderConfig::from_env()?)?;
    tracing::info!(
        schedule = %reconcile_config.schedule,
        verify_mode = %reconcile_config.verify_mode,
        "reconciliation job configured"
    );
    let reconciler = Reconciler::new(store, geocoder, reconcile_config);
    Ok(state.with_reconciler(Arc::new(reconciler)))
}
