//! # In-Memory Store
//!
//! Implements both [`RegionCatalog`] and [`SellerStore`] over
//! `parking_lot` locks. Cloning shares the underlying data. Locks are never
//! held across an `.await`.
//!
//! Each trait operation takes one lock for its whole duration, which gives
//! it the same per-statement atomicity the SQL store has.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sanctions_core::{
    default_regions, sort_catalog, GeoPoint, GeometryError, SanctionedRegion, SellerId,
};
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerUpdate, SpecFailure};

use crate::error::StoreError;
use crate::store::{CandidateQuery, RegionCatalog, SellerStore};

/// Thread-safe, cloneable in-memory catalog and seller store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    regions: Arc<RwLock<Vec<SanctionedRegion>>>,
    sellers: Arc<RwLock<BTreeMap<SellerId, SellerRecord>>>,
}

impl MemoryStore {
    /// Empty catalog, no sellers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given catalog (sorted into catalog order).
    pub fn with_regions(mut regions: Vec<SanctionedRegion>) -> Self {
        sort_catalog(&mut regions);
        Self {
            regions: Arc::new(RwLock::new(regions)),
            sellers: Arc::default(),
        }
    }

    /// Store seeded with the built-in catalog.
    pub fn seeded() -> Result<Self, GeometryError> {
        Ok(Self::with_regions(default_regions()?))
    }

    /// Replace the catalog.
    pub fn set_regions(&self, mut regions: Vec<SanctionedRegion>) {
        sort_catalog(&mut regions);
        *self.regions.write() = regions;
    }

    /// Insert or replace a seller, returning the previous record.
    pub fn insert_seller(&self, record: SellerRecord) -> Option<SellerRecord> {
        self.sellers.write().insert(record.seller_id.clone(), record)
    }

    /// Remove a seller.
    pub fn remove_seller(&self, seller_id: &SellerId) -> Option<SellerRecord> {
        self.sellers.write().remove(seller_id)
    }

    /// Number of sellers.
    pub fn seller_count(&self) -> usize {
        self.sellers.read().len()
    }
}

impl RegionCatalog for MemoryStore {
    async fn list_regions(&self) -> Result<Vec<SanctionedRegion>, StoreError> {
        Ok(self.regions.read().clone())
    }

    async fn intersects_any(&self, point: GeoPoint) -> Result<bool, StoreError> {
        Ok(self.regions.read().iter().any(|r| r.contains(point)))
    }
}

impl SellerStore for MemoryStore {
    async fn reset_pre_restricted(&self) -> Result<u64, StoreError> {
        let mut sellers = self.sellers.write();
        let mut touched = 0;
        for s in sellers.values_mut() {
            let stale_backup =
                !s.seller_type.is_restricted() && s.pre_restriction_seller_type.is_some();
            if !s.is_pre_restricted && !stale_backup {
                continue;
            }
            s.is_pre_restricted = false;
            if stale_backup {
                s.pre_restriction_seller_type = None;
            }
            touched += 1;
        }
        Ok(touched)
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<SellerRecord>, StoreError> {
        Ok(self
            .sellers
            .read()
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect())
    }

    async fn bulk_update(&self, updates: &[SellerUpdate]) -> Result<BulkWriteOutcome, StoreError> {
        let mut sellers = self.sellers.write();
        let mut outcome = BulkWriteOutcome {
            requested: updates.len(),
            ..BulkWriteOutcome::default()
        };
        for update in updates {
            match sellers.get_mut(&update.seller_id) {
                Some(record) => {
                    outcome.matched += 1;
                    if record.apply(&update.op) {
                        outcome.modified += 1;
                    }
                }
                None => outcome.failed.push(SpecFailure {
                    seller_id: update.seller_id.clone(),
                    reason: "seller not found".into(),
                }),
            }
        }
        Ok(outcome)
    }

    async fn list_all(&self) -> Result<Vec<SellerRecord>, StoreError> {
        Ok(self.sellers.read().values().cloned().collect())
    }

    async fn get(&self, seller_id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        Ok(self.sellers.read().get(seller_id).cloned())
    }
}
