//! # Reconciliation Job
//!
//! One pass:
//!
//! 1. Reset `is_pre_restricted` on every seller and drop stale backups of
//!    visible sellers.
//! 2. Read the catalog. Abort when it is unavailable, and when it is empty
//!    unless configured to proceed (which releases every restricted seller).
//! 3. Find candidates and run Phase A.
//! 4. Classify every candidate. Unresolved and corrupt sellers are left for
//!    the next pass.
//! 5. Run Phase B.
//! 6. Log and retain a [`PassReport`].
//!
//! Only one pass runs at a time; an overlapping request gets
//! [`ReconcileError::AlreadyRunning`].

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sanctions_core::{Jurisdiction, SellerId};
use sanctions_geocoder::ReverseGeocoder;
use sanctions_state::{plan_phase_a, plan_phase_b, BulkWriteOutcome, Resolution};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::store::{CandidateQuery, RegionCatalog, SellerStore};
use crate::verifier::{Verdict, Verifier, VerifyMode};

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Both phases ran.
    Completed,
    /// The pass stopped early.
    Aborted {
        /// Rendered error.
        reason: String,
    },
}

/// A seller that a pass could not settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerFailure {
    /// Seller.
    pub seller_id: SellerId,
    /// Why.
    pub reason: String,
}

/// A seller restricted (or kept restricted) by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionedMatch {
    /// Seller.
    pub seller_id: SellerId,
    /// Matched jurisdiction.
    pub jurisdiction: Jurisdiction,
    /// Geocoded place name.
    pub place_name: String,
}

/// Summary of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub verify_mode: VerifyMode,
    pub outcome: PassOutcome,
    /// Rows whose pre-restricted flag was cleared.
    pub reset: u64,
    /// Cataloged regions.
    pub regions: usize,
    pub candidates: usize,
    pub sanctioned: Vec<SanctionedMatch>,
    pub unsanctioned: usize,
    pub unresolved: usize,
    /// Unresolved, corrupt, and unmatched-spec sellers.
    pub failures: Vec<SellerFailure>,
    pub phase_a: Option<BulkWriteOutcome>,
    pub phase_b: Option<BulkWriteOutcome>,
}

impl PassReport {
    fn start(verify_mode: VerifyMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            verify_mode,
            outcome: PassOutcome::Completed,
            reset: 0,
            regions: 0,
            candidates: 0,
            sanctioned: Vec::new(),
            unsanctioned: 0,
            unresolved: 0,
            failures: Vec::new(),
            phase_a: None,
            phase_b: None,
        }
    }
}

/// Clears the running flag when a pass ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The reconciliation job.
pub struct Reconciler<S, G> {
    store: S,
    verifier: Verifier<G>,
    config: ReconcileConfig,
    running: AtomicBool,
    last_report: Mutex<Option<PassReport>>,
}

impl<S, G> Reconciler<S, G>
where
    S: RegionCatalog + SellerStore,
    G: ReverseGeocoder,
{
    /// Create a job over a store and geocoder.
    pub fn new(store: S, geocoder: G, config: ReconcileConfig) -> Self {
        Self {
            store,
            verifier: Verifier::new(geocoder, config.verify_mode),
            config,
            running: AtomicBool::new(false),
            last_report: Mutex::new(None),
        }
    }

    /// Job configuration.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Whether a pass is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Report of the most recent pass, completed or aborted.
    pub fn last_report(&self) -> Option<PassReport> {
        self.last_report.lock().clone()
    }

    /// Run one full pass.
    ///
    /// Aborted passes are also retained as the last report.
    pub async fn run_pass(&self) -> Result<PassReport, ReconcileError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ReconcileError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        let mut report = PassReport::start(self.verifier.mode());
        let span = tracing::info_span!("reconcile", run_id = %report.run_id);
        let result = self.execute(&mut report).instrument(span.clone()).await;
        report.finished_at = Utc::now();

        span.in_scope(|| match &result {
            Ok(()) => tracing::info!(
                regions = report.regions,
                candidates = report.candidates,
                sanctioned = report.sanctioned.len(),
                unsanctioned = report.unsanctioned,
                unresolved = report.unresolved,
                failures = report.failures.len(),
                "reconciliation pass completed"
            ),
            Err(e) => {
                tracing::error!(error = %e, "reconciliation pass aborted");
                report.outcome = PassOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
        });
        *self.last_report.lock() = Some(report.clone());
        result.map(|()| report)
    }

    async fn execute(&self, report: &mut PassReport) -> Result<(), ReconcileError> {
        report.reset = self
            .store
            .reset_pre_restricted()
            .await
            .map_err(|source| ReconcileError::Store {
                step: "reset",
                source,
            })?;

        let regions = self
            .store
            .list_regions()
            .await
            .map_err(ReconcileError::CatalogUnavailable)?;
        report.regions = regions.len();
        if regions.is_empty() {
            if self.config.abort_on_empty_catalog {
                return Err(ReconcileError::EmptyCatalog);
            }
            tracing::warn!("region catalog is empty; restricted sellers will be restored");
        }

        let candidates = self
            .store
            .find_candidates(&CandidateQuery::from_regions(&regions))
            .await
            .map_err(|source| ReconcileError::Store {
                step: "filter",
                source,
            })?;
        report.candidates = candidates.len();
        tracing::info!(candidates = candidates.len(), "candidate sellers found");

        let phase_a = self
            .store
            .bulk_update(&plan_phase_a(&candidates))
            .await
            .map_err(|source| ReconcileError::BulkWrite { phase: 'A', source })?;
        record_spec_failures(report, &phase_a, 'A');
        report.phase_a = Some(phase_a);

        let mut resolutions = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let classification = match self.verifier.classify(candidate, &regions).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(seller_id = %candidate.seller_id, error = %e, "skipping corrupt seller");
                    report.failures.push(SellerFailure {
                        seller_id: candidate.seller_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let sanctioned = match classification.verdict {
                Verdict::Sanctioned {
                    jurisdiction,
                    place_name,
                } => {
                    report.sanctioned.push(SanctionedMatch {
                        seller_id: classification.seller_id.clone(),
                        jurisdiction,
                        place_name,
                    });
                    true
                }
                Verdict::Unsanctioned => {
                    report.unsanctioned += 1;
                    false
                }
                Verdict::Unresolved { failures } => {
                    report.unresolved += 1;
                    let reason = failures
                        .iter()
                        .map(|f| format!("{}: {}", f.jurisdiction, f.error))
                        .collect::<Vec<_>>()
                        .join("; ");
                    report.failures.push(SellerFailure {
                        seller_id: classification.seller_id,
                        reason: format!("unresolved ({reason})"),
                    });
                    continue;
                }
            };
            resolutions.push(Resolution {
                seller_id: classification.seller_id,
                backup: classification.backup_type,
                sanctioned,
            });
        }

        let phase_b = self
            .store
            .bulk_update(&plan_phase_b(resolutions))
            .await
            .map_err(|source| ReconcileError::BulkWrite { phase: 'B', source })?;
        record_spec_failures(report, &phase_b, 'B');
        report.phase_b = Some(phase_b);
        Ok(())
    }
}

fn record_spec_failures(report: &mut PassReport, outcome: &BulkWriteOutcome, phase: char) {
    tracing::info!(
        phase = %phase,
        requested = outcome.requested,
        matched = outcome.matched,
        modified = outcome.modified,
        failed = outcome.failed.len(),
        "bulk write applied"
    );
    for f in &outcome.failed {
        tracing::warn!(phase = %phase, seller_id = %f.seller_id, reason = %f.reason, "update spec not applied");
        report.failures.push(SellerFailure {
            seller_id: f.seller_id.clone(),
            reason: format!("phase {phase}: {}", f.reason),
        });
    }
}
