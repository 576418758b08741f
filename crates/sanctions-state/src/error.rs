//! Errors raised when a persisted seller row cannot be interpreted.

use sanctions_core::SellerId;
use thiserror::Error;

/// Seller state errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// The stored row violates the restriction invariant.
    #[error("seller {seller_id} has a corrupt restriction record: {reason}")]
    CorruptRecord {
        /// Affected seller.
        seller_id: SellerId,
        /// What is wrong with the row.
        reason: String,
    },

    /// A stored seller type string is not one of the known types.
    #[error("unknown seller type: \"{0}\"")]
    UnknownSellerType(String),
}
