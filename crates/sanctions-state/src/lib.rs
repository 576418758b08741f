//! # sanctions-state: Seller Restriction State Machine
//!
//! A seller is either *visible* (`Active`, `Test`, `Inactive`) or
//! *restricted*. Restriction always remembers the visible type the seller had
//! before, so that a later pass can restore it exactly.
//!
//! ## Modules
//!
//! - **Status** (`status.rs`): [`VisibleType`], the persisted [`SellerType`],
//!   and the tagged [`SellerStatus`] that makes "restricted without a backup"
//!   unrepresentable.
//!
//! - **Record** (`record.rs`): [`SellerRecord`], the flat persisted form, and
//!   its validated conversion into [`SellerStatus`].
//!
//! - **Update** (`update.rs`): [`UpdateOp`] / [`SellerUpdate`] specs, the
//!   Phase A and Phase B planners, and [`BulkWriteOutcome`].
//!
//! ## Transitions
//!
//! ```text
//! Visible(t) ──restrict──▶ Restricted { previous: t }
//! Restricted { previous: t } ──restore──▶ Visible(t)
//! ```
//!
//! Restricting an already-restricted seller keeps the original backup; the
//! backup is never overwritten with `Restricted`.

pub mod error;
pub mod record;
pub mod status;
pub mod update;

pub use error::StateError;
pub use record::SellerRecord;
pub use status::{SellerStatus, SellerType, VisibleType};
pub use update::{
    plan_phase_a, plan_phase_b, BulkWriteOutcome, Resolution, SellerUpdate, SpecFailure, UpdateOp,
};
