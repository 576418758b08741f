//! # Application State
//!
//! Shared state for the Axum application: configuration, the active store
//! (in-memory or Postgres), the reconciliation job when a geocoder is
//! configured, and request metrics.
//!
//! The storage traits return `impl Future`, which rules out trait objects,
//! so the two store backends are dispatched through [`ComplianceStore`].

use std::path::PathBuf;
use std::sync::Arc;

use sanctions_core::{GeoPoint, SanctionedRegion, SellerId};
use sanctions_engine::{CandidateQuery, MemoryStore, Reconciler, RegionCatalog, SellerStore, StoreError};
use sanctions_geocoder::GeocoderClient;
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerUpdate};
use thiserror::Error;

use crate::db::PgStore;
use crate::middleware::metrics::ApiMetrics;

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// JSON region catalog used instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("catalog_path", &self.catalog_path)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `AUTH_TOKEN` (optional; empty counts as unset)
    /// - `REGION_CATALOG_PATH` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 8080,
        };
        Ok(Self {
            port,
            auth_token: std::env::var("AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            catalog_path: std::env::var_os("REGION_CATALOG_PATH").map(PathBuf::from),
        })
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid PORT: {0:?}")]
    InvalidPort(String),
}

/// The store backing the service.
#[derive(Debug, Clone)]
pub enum ComplianceStore {
    /// Process-local store.
    Memory(MemoryStore),
    /// Postgres + PostGIS.
    Postgres(PgStore),
}

impl ComplianceStore {
    /// Short backend name for logs and probes.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl From<MemoryStore> for ComplianceStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<PgStore> for ComplianceStore {
    fn from(store: PgStore) -> Self {
        Self::Postgres(store)
    }
}

impl RegionCatalog for ComplianceStore {
    async fn list_regions(&self) -> Result<Vec<SanctionedRegion>, StoreError> {
        match self {
            Self::Memory(s) => s.list_regions().await,
            Self::Postgres(s) => s.list_regions().await,
        }
    }

    async fn intersects_any(&self, point: GeoPoint) -> Result<bool, StoreError> {
        match self {
            Self::Memory(s) => s.intersects_any(point).await,
            Self::Postgres(s) => s.intersects_any(point).await,
        }
    }
}

impl SellerStore for ComplianceStore {
    async fn reset_pre_restricted(&self) -> Result<u64, StoreError> {
        match self {
            Self::Memory(s) => s.reset_pre_restricted().await,
            Self::Postgres(s) => s.reset_pre_restricted().await,
        }
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<SellerRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.find_candidates(query).await,
            Self::Postgres(s) => s.find_candidates(query).await,
        }
    }

    async fn bulk_update(&self, updates: &[SellerUpdate]) -> Result<BulkWriteOutcome, StoreError> {
        match self {
            Self::Memory(s) => s.bulk_update(updates).await,
            Self::Postgres(s) => s.bulk_update(updates).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<SellerRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.list_all().await,
            Self::Postgres(s) => s.list_all().await,
        }
    }

    async fn get(&self, seller_id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        match self {
            Self::Memory(s) => s.get(seller_id).await,
            Self::Postgres(s) => s.get(seller_id).await,
        }
    }
}

/// The reconciliation job as wired into the service.
pub type ServiceReconciler = Reconciler<ComplianceStore, GeocoderClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ComplianceStore,
    /// `None` when no geocoder is configured; manual reconciliation then
    /// answers 503.
    pub reconciler: Option<Arc<ServiceReconciler>>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// State over `store` with no reconciliation job.
    pub fn new(config: AppConfig, store: impl Into<ComplianceStore>) -> Self {
        Self {
            config,
            store: store.into(),
            reconciler: None,
            metrics: ApiMetrics::new(),
        }
    }

    /// Attach the reconciliation job.
    pub fn with_reconciler(mut self, reconciler: Arc<ServiceReconciler>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }
}
