//! # Seller Record
//!
//! The flat, persisted shape of a seller as the compliance engine sees it.
//! Everything else about a seller (profile, reviews, settings) belongs to the
//! marketplace and never reaches this crate.

use sanctions_core::{GeoPoint, SellerId};
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::status::{SellerStatus, SellerType, VisibleType};
use crate::update::UpdateOp;

/// A seller row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerRecord {
    /// Unique external identifier.
    pub seller_id: SellerId,
    /// Current type.
    pub seller_type: SellerType,
    /// Backup written by Phase A and kept while restricted.
    pub pre_restriction_seller_type: Option<VisibleType>,
    /// Set for candidates of the most recent reconciliation pass.
    pub is_pre_restricted: bool,
    /// Declared sell location.
    pub sell_map_center: GeoPoint,
}

impl SellerRecord {
    /// A freshly registered, unrestricted seller.
    pub fn new(seller_id: SellerId, seller_type: VisibleType, sell_map_center: GeoPoint) -> Self {
        Self {
            seller_id,
            seller_type: seller_type.into(),
            pre_restriction_seller_type: None,
            is_pre_restricted: false,
            sell_map_center,
        }
    }

    /// Interpret the row as a [`SellerStatus`].
    ///
    /// # Errors
    ///
    /// [`StateError::CorruptRecord`] when the seller is restricted but has no
    /// backup type.
    pub fn status(&self) -> Result<SellerStatus, StateError> {
        match self.seller_type.as_visible() {
            Some(seller_type) => Ok(SellerStatus::Visible { seller_type }),
            None => self
                .pre_restriction_seller_type
                .map(|previous| SellerStatus::Restricted { previous })
                .ok_or_else(|| StateError::CorruptRecord {
                    seller_id: self.seller_id.clone(),
                    reason: "restricted without a pre-restriction seller type".into(),
                }),
        }
    }

    /// Apply one update op. Returns whether any field changed.
    pub fn apply(&mut self, op: &UpdateOp) -> bool {
        let before = (
            self.seller_type,
            self.pre_restriction_seller_type,
            self.is_pre_restricted,
        );
        match *op {
            UpdateOp::MarkPreRestricted { backup } => {
                if let Some(b) = backup {
                    self.pre_restriction_seller_type = Some(b);
                }
                self.is_pre_restricted = true;
            }
            UpdateOp::Restrict { previous } => {
                self.seller_type = SellerType::Restricted;
                self.pre_restriction_seller_type = Some(previous);
            }
            UpdateOp::Restore { to } => {
                self.seller_type = to.into();
                self.pre_restriction_seller_type = None;
            }
        }
        before
            != (
                self.seller_type,
                self.pre_restriction_seller_type,
                self.is_pre_restricted,
            )
    }
}
