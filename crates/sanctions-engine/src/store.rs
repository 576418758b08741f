//! # Storage Seams
//!
//! The engine reads the region catalog and reads/writes sellers through two
//! traits. Both return `Send` futures so a pass can run on a spawned task.

use std::future::Future;

use sanctions_core::{GeoPoint, SanctionedRegion, SellerId};
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerUpdate};

use crate::error::StoreError;

/// Read-only access to the sanctioned-region catalog.
pub trait RegionCatalog: Send + Sync {
    /// Every cataloged region, in catalog order.
    fn list_regions(&self) -> impl Future<Output = Result<Vec<SanctionedRegion>, StoreError>> + Send;

    /// Whether any cataloged boundary contains the point (boundary counts
    /// as inside).
    fn intersects_any(&self, point: GeoPoint) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Seller persistence as needed by reconciliation.
pub trait SellerStore: Send + Sync {
    /// Clear `is_pre_restricted` on every seller, and drop the backup type of
    /// every seller that is not restricted (left over from an unresolved
    /// candidate). Returns rows touched.
    fn reset_pre_restricted(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Sellers matching the candidate predicate. Order is unspecified.
    fn find_candidates(
        &self,
        query: &CandidateQuery,
    ) -> impl Future<Output = Result<Vec<SellerRecord>, StoreError>> + Send;

    /// Apply many independent specs as one bulk operation.
    fn bulk_update(
        &self,
        updates: &[SellerUpdate],
    ) -> impl Future<Output = Result<BulkWriteOutcome, StoreError>> + Send;

    /// Every seller.
    fn list_all(&self) -> impl Future<Output = Result<Vec<SellerRecord>, StoreError>> + Send;

    /// One seller by id.
    fn get(
        &self,
        seller_id: &SellerId,
    ) -> impl Future<Output = Result<Option<SellerRecord>, StoreError>> + Send;
}

/// The candidate predicate: sell location within the union of the given
/// boundaries, or seller currently restricted.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    regions: Vec<SanctionedRegion>,
}

impl CandidateQuery {
    /// Build the predicate for a catalog snapshot.
    pub fn from_regions(regions: &[SanctionedRegion]) -> Self {
        Self {
            regions: regions.to_vec(),
        }
    }

    /// The boundaries in the predicate.
    pub fn regions(&self) -> &[SanctionedRegion] {
        &self.regions
    }

    /// Evaluate the predicate in memory.
    pub fn matches(&self, seller: &SellerRecord) -> bool {
        seller.seller_type.is_restricted()
            || self
                .regions
                .iter()
                .any(|r| r.contains(seller.sell_map_center))
    }

    /// The boundaries as a GeoJSON `GeometryCollection`, for stores that
    /// evaluate the predicate server-side.
    pub fn geometry_collection(&self) -> serde_json::Value {
        let geometries: Vec<_> = self.regions.iter().map(|r| r.boundary.to_geojson()).collect();
        serde_json::json!({ "type": "GeometryCollection", "geometries": geometries })
    }
}
