//! # Update Specs
//!
//! A reconciliation pass writes in two bulk phases. Each phase is a list of
//! [`SellerUpdate`] specs, one per seller, executed by the store as a single
//! bulk operation. Specs are independent: a spec whose seller disappeared is
//! reported in [`BulkWriteOutcome::failed`] and the rest still apply.
//!
//! Phase A marks every candidate as pre-restricted and snapshots the current
//! type of visible candidates. Restricted candidates keep their existing
//! backup. Phase B then restricts or restores each resolved candidate.

use sanctions_core::SellerId;
use serde::{Deserialize, Serialize};

use crate::record::SellerRecord;
use crate::status::VisibleType;

/// One field-level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UpdateOp {
    /// Set `is_pre_restricted`; when `backup` is present also write it as the
    /// pre-restriction type.
    MarkPreRestricted {
        /// Snapshot of the current visible type, `None` for restricted sellers.
        backup: Option<VisibleType>,
    },
    /// `seller_type := Restricted`, `pre_restriction_seller_type := previous`.
    Restrict {
        /// Backup to keep.
        previous: VisibleType,
    },
    /// `seller_type := to`, `pre_restriction_seller_type := null`.
    Restore {
        /// Type to restore.
        to: VisibleType,
    },
}

impl UpdateOp {
    /// Short name, used as the op discriminator in SQL bulk statements.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MarkPreRestricted { .. } => "mark",
            Self::Restrict { .. } => "restrict",
            Self::Restore { .. } => "restore",
        }
    }

    /// The visible type argument carried by the op, if any.
    pub fn type_arg(&self) -> Option<VisibleType> {
        match *self {
            Self::MarkPreRestricted { backup } => backup,
            Self::Restrict { previous } => Some(previous),
            Self::Restore { to } => Some(to),
        }
    }
}

/// An update targeted at one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerUpdate {
    /// Target seller.
    pub seller_id: SellerId,
    /// Transition to apply.
    pub op: UpdateOp,
}

/// Result of verifying one candidate, as consumed by Phase B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Candidate.
    pub seller_id: SellerId,
    /// The type to keep as backup or restore to.
    pub backup: VisibleType,
    /// Whether the geocoder confirmed a sanctioned jurisdiction.
    pub sanctioned: bool,
}

/// A spec that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFailure {
    /// Target seller.
    pub seller_id: SellerId,
    /// Human-readable reason.
    pub reason: String,
}

/// Outcome of one bulk write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkWriteOutcome {
    /// Specs submitted.
    pub requested: usize,
    /// Specs whose seller was found.
    pub matched: usize,
    /// Specs that changed at least one field.
    pub modified: usize,
    /// Specs that did not match a seller.
    pub failed: Vec<SpecFailure>,
}

impl BulkWriteOutcome {
    /// Whether every submitted spec matched a seller.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.matched == self.requested
    }
}

/// Phase A specs for a candidate set.
pub fn plan_phase_a(candidates: &[SellerRecord]) -> Vec<SellerUpdate> {
    candidates
        .iter()
        .map(|c| SellerUpdate {
            seller_id: c.seller_id.clone(),
            op: UpdateOp::MarkPreRestricted {
                backup: c.seller_type.as_visible(),
            },
        })
        .collect()
}

/// Phase B specs: restrict sanctioned sellers, restore the rest.
pub fn plan_phase_b<I>(resolutions: I) -> Vec<SellerUpdate>
where
    I: IntoIterator<Item = Resolution>,
{
    resolutions
        .into_iter()
        .map(|r| SellerUpdate {
            op: if r.sanctioned {
                UpdateOp::Restrict { previous: r.backup }
            } else {
                UpdateOp::Restore { to: r.backup }
            },
            seller_id: r.seller_id,
        })
        .collect()
}
