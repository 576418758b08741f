//! # sanctions-engine: Reconciliation Engine
//!
//! Keeps each seller's visibility consistent with whether their declared
//! sell location lies in a sanctioned jurisdiction.
//!
//! ## Pipeline
//!
//! ```text
//! RegionCatalog ─▶ CandidateQuery ─▶ SellerStore::find_candidates
//!                                        │
//!                                  Phase A (mark)
//!                                        │
//!                      Verifier ◀── ReverseGeocoder (rate-limited)
//!                                        │
//!                                  Phase B (restrict / restore)
//! ```
//!
//! The coarse geofence filter is cheap and generous; the geocoder is slow
//! and authoritative. A pass therefore only geocodes sellers that sit inside
//! some boundary, plus sellers that are already restricted (so that they can
//! be released when the catalog or the world changes).
//!
//! ## Storage seams
//!
//! [`RegionCatalog`] and [`SellerStore`] abstract persistence. This crate
//! ships [`MemoryStore`]; the API crate provides the Postgres/PostGIS
//! implementation.

pub mod config;
pub mod error;
pub mod memory;
pub mod reconcile;
pub mod schedule;
pub mod store;
pub mod verifier;

pub use config::{ConfigError, ReconcileConfig};
pub use error::{ReconcileError, StoreError};
pub use memory::MemoryStore;
pub use reconcile::{PassOutcome, PassReport, Reconciler, SanctionedMatch, SellerFailure};
pub use schedule::{run_daily, DailySchedule, ScheduleError};
pub use store::{CandidateQuery, RegionCatalog, SellerStore};
pub use verifier::{Classification, LookupFailure, Verdict, Verifier, VerifyMode};
