//! # Database Persistence Layer
//!
//! Postgres + PostGIS persistence for the region catalog and the seller
//! compliance projection, via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set the API
//! reads and writes through [`PgStore`]; when absent it runs against the
//! in-memory store (suitable for development and testing).
//!
//! Geospatial predicates run server-side: the fast path and the candidate
//! filter both use `ST_Intersects`, so boundary points count as inside just
//! as they do in the in-memory store.

pub mod regions;
pub mod sellers;

use sanctions_core::{GeoPoint, SanctionedRegion, SellerId};
use sanctions_engine::{CandidateQuery, RegionCatalog, SellerStore, StoreError};
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerUpdate};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set; running in-memory only mode. \
                 Seller state will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Region catalog and seller store backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connected pool. Migrations must already be applied.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert `regions` when the catalog table is empty. Returns the number
    /// of rows inserted.
    pub async fn seed_regions_if_empty(&self, regions: &[SanctionedRegion]) -> Result<u64, StoreError> {
        let existing = regions::count(&self.pool)
            .await
            .map_err(|e| StoreError::backend("count_regions", e))?;
        if existing > 0 {
            tracing::info!(existing, "region catalog already populated");
            return Ok(0);
        }
        let inserted = regions::insert_all(&self.pool, regions)
            .await
            .map_err(|e| StoreError::backend("seed_regions", e))?;
        tracing::info!(inserted, "region catalog seeded");
        Ok(inserted)
    }
}

impl RegionCatalog for PgStore {
    async fn list_regions(&self) -> Result<Vec<SanctionedRegion>, StoreError> {
        regions::list(&self.pool).await
    }

    async fn intersects_any(&self, point: GeoPoint) -> Result<bool, StoreError> {
        regions::intersects_any(&self.pool, point)
            .await
            .map_err(|e| StoreError::backend("intersects_any", e))
    }
}

impl SellerStore for PgStore {
    async fn reset_pre_restricted(&self) -> Result<u64, StoreError> {
        sellers::reset_pre_restricted(&self.pool)
            .await
            .map_err(|e| StoreError::backend("reset_pre_restricted", e))
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<SellerRecord>, StoreError> {
        sellers::find_candidates(&self.pool, query).await
    }

    async fn bulk_update(&self, updates: &[SellerUpdate]) -> Result<BulkWriteOutcome, StoreError> {
        sellers::bulk_update(&self.pool, updates)
            .await
            .map_err(|e| StoreError::backend("bulk_update", e))
    }

    async fn list_all(&self) -> Result<Vec<SellerRecord>, StoreError> {
        sellers::list_all(&self.pool).await
    }

    async fn get(&self, seller_id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        sellers::get(&self.pool, seller_id).await
    }
}
