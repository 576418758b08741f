//! End-to-end reconciliation passes over the in-memory store with a
//! scripted geocoder.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sanctions_core::{GeoPoint, Jurisdiction, SanctionedRegion, SellerId};
use sanctions_engine::{
    run_daily, CandidateQuery, DailySchedule, MemoryStore, PassOutcome, ReconcileConfig,
    ReconcileError, Reconciler, RegionCatalog, SellerStore, StoreError,
};
use sanctions_geocoder::{GeocodeError, ReverseGeocoder};
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerType, SellerUpdate, VisibleType};
use tokio::sync::Semaphore;

// ── Test doubles ─────────────────────────────────────────────────────

/// Answers by rounded (lat, lon); unknown points fail.
#[derive(Clone, Default)]
struct ScriptedGeocoder {
    answers: Arc<Mutex<HashMap<(i64, i64), Result<String, String>>>>,
    gate: Option<Arc<Semaphore>>,
}

fn key(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * 100.0).round() as i64, (lon * 100.0).round() as i64)
}

impl ScriptedGeocoder {
    fn answer(&self, lat: f64, lon: f64, place: &str) {
        self.answers.lock().insert(key(lat, lon), Ok(place.to_string()));
    }

    fn fail(&self, lat: f64, lon: f64) {
        self.answers.lock().insert(key(lat, lon), Err("upstream 503".to_string()));
    }
}

impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }
        let answer = self.answers.lock().get(&key(lat, lon)).cloned();
        match answer {
            Some(Ok(name)) => Ok(name),
            Some(Err(e)) => Err(GeocodeError::Status {
                status: 503,
                body: e,
            }),
            None => Err(GeocodeError::MissingDisplayName),
        }
    }
}

/// A store whose catalog is unreachable.
#[derive(Clone)]
struct CatalogDown(MemoryStore);

impl RegionCatalog for CatalogDown {
    async fn list_regions(&self) -> Result<Vec<SanctionedRegion>, StoreError> {
        Err(StoreError::backend(
            "list_regions",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "catalog offline"),
        ))
    }

    async fn intersects_any(&self, _point: GeoPoint) -> Result<bool, StoreError> {
        Ok(false)
    }
}

impl SellerStore for CatalogDown {
    async fn reset_pre_restricted(&self) -> Result<u64, StoreError> {
        self.0.reset_pre_restricted().await
    }
    async fn find_candidates(&self, q: &CandidateQuery) -> Result<Vec<SellerRecord>, StoreError> {
        self.0.find_candidates(q).await
    }
    async fn bulk_update(&self, u: &[SellerUpdate]) -> Result<BulkWriteOutcome, StoreError> {
        self.0.bulk_update(u).await
    }
    async fn list_all(&self) -> Result<Vec<SellerRecord>, StoreError> {
        self.0.list_all().await
    }
    async fn get(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        self.0.get(id).await
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

const TEHRAN: (f64, f64) = (35.69, 51.39);
const PYONGYANG: (f64, f64) = (39.03, 125.75);
const HAVANA: (f64, f64) = (23.11, -82.37);
const LISBON: (f64, f64) = (38.72, -9.14);

fn id(s: &str) -> SellerId {
    SellerId::new(s).unwrap()
}

fn add_seller(store: &MemoryStore, seller_id: &str, t: VisibleType, at: (f64, f64)) {
    store.insert_seller(SellerRecord::new(
        id(seller_id),
        t,
        GeoPoint::from_lat_lon(at.0, at.1).unwrap(),
    ));
}

async fn get(store: &MemoryStore, seller_id: &str) -> SellerRecord {
    store.get(&id(seller_id)).await.unwrap().unwrap()
}

fn setup() -> (MemoryStore, ScriptedGeocoder) {
    let store = MemoryStore::seeded().unwrap();
    let geocoder = ScriptedGeocoder::default();
    geocoder.answer(TEHRAN.0, TEHRAN.1, "Tehran, Tehran Province, Iran");
    geocoder.answer(PYONGYANG.0, PYONGYANG.1, "Pyongyang, North Korea");
    geocoder.answer(HAVANA.0, HAVANA.1, "Havana, Cuba");
    (store, geocoder)
}

fn assert_restriction_invariant(sellers: &[SellerRecord]) {
    for s in sellers {
        assert_eq!(
            s.seller_type == SellerType::Restricted,
            s.pre_restriction_seller_type.is_some(),
            "invariant violated for {}: {s:?}",
            s.seller_id
        );
    }
}

// ── Scenarios ────────────────────────────────────────────────────────

#[tokio::test]
async fn tehran_seller_is_restricted_with_backup() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    add_seller(&store, "lisbon", VisibleType::Active, LISBON);

    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    let report = job.run_pass().await.unwrap();

    let s = get(&store, "tehran").await;
    assert_eq!(s.seller_type, SellerType::Restricted);
    assert_eq!(s.pre_restriction_seller_type, Some(VisibleType::Active));
    assert!(s.is_pre_restricted);

    let other = get(&store, "lisbon").await;
    assert_eq!(other.seller_type, SellerType::Active);
    assert!(!other.is_pre_restricted);

    assert_eq!(report.outcome, PassOutcome::Completed);
    assert_eq!(report.candidates, 1);
    assert_eq!(report.sanctioned.len(), 1);
    assert_eq!(report.sanctioned[0].jurisdiction, Jurisdiction::Iran);
    assert_restriction_invariant(&store.list_all().await.unwrap());
}

#[tokio::test]
async fn second_pass_with_no_changes_is_idempotent() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Test, TEHRAN);
    add_seller(&store, "havana", VisibleType::Inactive, HAVANA);
    add_seller(&store, "lisbon", VisibleType::Active, LISBON);

    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    job.run_pass().await.unwrap();
    let after_first = store.list_all().await.unwrap();

    let second = job.run_pass().await.unwrap();
    assert_eq!(store.list_all().await.unwrap(), after_first);
    assert_eq!(second.phase_b.unwrap().modified, 0);
}

#[tokio::test]
async fn restricted_seller_keeps_original_backup_across_passes() {
    let (store, geocoder) = setup();
    add_seller(&store, "pyongyang", VisibleType::Test, PYONGYANG);

    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    for _ in 0..3 {
        job.run_pass().await.unwrap();
    }
    let s = get(&store, "pyongyang").await;
    assert_eq!(s.seller_type, SellerType::Restricted);
    assert_eq!(s.pre_restriction_seller_type, Some(VisibleType::Test));
}

#[tokio::test]
async fn seller_is_restored_when_geocoder_no_longer_confirms() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Inactive, TEHRAN);

    let job = Reconciler::new(store.clone(), geocoder.clone(), ReconcileConfig::default());
    job.run_pass().await.unwrap();
    assert_eq!(get(&store, "tehran").await.seller_type, SellerType::Restricted);

    geocoder.answer(TEHRAN.0, TEHRAN.1, "Somewhere, Atlantis");
    let report = job.run_pass().await.unwrap();
    let s = get(&store, "tehran").await;
    assert_eq!(s.seller_type, SellerType::Inactive);
    assert_eq!(s.pre_restriction_seller_type, None);
    assert_eq!(report.unsanctioned, 1);
}

#[tokio::test]
async fn seller_moved_out_of_every_region_is_restored() {
    let (store, geocoder) = setup();
    add_seller(&store, "mover", VisibleType::Active, TEHRAN);
    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    job.run_pass().await.unwrap();

    let mut s = get(&store, "mover").await;
    s.sell_map_center = GeoPoint::from_lat_lon(LISBON.0, LISBON.1).unwrap();
    store.insert_seller(s);

    job.run_pass().await.unwrap();
    let s = get(&store, "mover").await;
    assert_eq!(s.seller_type, SellerType::Active);
    assert!(s.pre_restriction_seller_type.is_none());
}

#[tokio::test]
async fn geocode_failure_is_isolated_to_its_seller() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    add_seller(&store, "havana", VisibleType::Active, HAVANA);
    geocoder.fail(HAVANA.0, HAVANA.1);

    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    let report = job.run_pass().await.unwrap();

    assert_eq!(get(&store, "tehran").await.seller_type, SellerType::Restricted);

    // Unresolved: marked by Phase A, untouched by Phase B.
    let havana = get(&store, "havana").await;
    assert_eq!(havana.seller_type, SellerType::Active);
    assert_eq!(havana.pre_restriction_seller_type, Some(VisibleType::Active));
    assert!(havana.is_pre_restricted);

    assert_eq!(report.unresolved, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].seller_id, id("havana"));
}

#[tokio::test]
async fn unresolved_seller_that_moves_away_loses_its_backup() {
    let (store, geocoder) = setup();
    add_seller(&store, "havana", VisibleType::Active, HAVANA);
    geocoder.fail(HAVANA.0, HAVANA.1);
    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    job.run_pass().await.unwrap();
    assert_eq!(
        get(&store, "havana").await.pre_restriction_seller_type,
        Some(VisibleType::Active)
    );

    let mut moved = get(&store, "havana").await;
    moved.sell_map_center = GeoPoint::from_lat_lon(LISBON.0, LISBON.1).unwrap();
    store.insert_seller(moved);

    let report = job.run_pass().await.unwrap();
    assert!(matches!(report.outcome, PassOutcome::Completed));
    assert_eq!(report.candidates, 0);

    let s = get(&store, "havana").await;
    assert_eq!(s.seller_type, SellerType::Active);
    assert_eq!(s.pre_restriction_seller_type, None);
    assert!(!s.is_pre_restricted);
    assert_restriction_invariant(&store.list_all().await.unwrap());
}

#[tokio::test]
async fn unresolved_seller_is_restricted_once_geocoder_recovers() {
    let (store, geocoder) = setup();
    add_seller(&store, "havana", VisibleType::Inactive, HAVANA);
    geocoder.fail(HAVANA.0, HAVANA.1);
    let job = Reconciler::new(store.clone(), geocoder.clone(), ReconcileConfig::default());
    job.run_pass().await.unwrap();

    geocoder.answer(HAVANA.0, HAVANA.1, "Havana, Cuba");
    job.run_pass().await.unwrap();
    let s = get(&store, "havana").await;
    assert_eq!(s.seller_type, SellerType::Restricted);
    assert_eq!(s.pre_restriction_seller_type, Some(VisibleType::Inactive));
    assert_restriction_invariant(&store.list_all().await.unwrap());
}

#[tokio::test]
async fn unresolved_restricted_seller_stays_restricted() {
    let (store, geocoder) = setup();
    add_seller(&store, "havana", VisibleType::Test, HAVANA);
    let job = Reconciler::new(store.clone(), geocoder.clone(), ReconcileConfig::default());
    job.run_pass().await.unwrap();

    geocoder.fail(HAVANA.0, HAVANA.1);
    job.run_pass().await.unwrap();
    let s = get(&store, "havana").await;
    assert_eq!(s.seller_type, SellerType::Restricted);
    assert_eq!(s.pre_restriction_seller_type, Some(VisibleType::Test));
}

#[tokio::test]
async fn corrupt_restricted_row_is_skipped() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    let mut corrupt = SellerRecord::new(
        id("corrupt"),
        VisibleType::Active,
        GeoPoint::from_lat_lon(HAVANA.0, HAVANA.1).unwrap(),
    );
    corrupt.seller_type = SellerType::Restricted;
    store.insert_seller(corrupt);

    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    let report = job.run_pass().await.unwrap();

    assert_eq!(get(&store, "tehran").await.seller_type, SellerType::Restricted);
    let c = get(&store, "corrupt").await;
    assert_eq!(c.seller_type, SellerType::Restricted);
    assert!(c.is_pre_restricted);
    assert!(report.failures.iter().any(|f| f.seller_id == id("corrupt")));
}

#[tokio::test]
async fn unavailable_catalog_aborts_before_any_transition() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);

    let job = Reconciler::new(CatalogDown(store.clone()), geocoder, ReconcileConfig::default());
    let err = job.run_pass().await.unwrap_err();
    assert!(matches!(err, ReconcileError::CatalogUnavailable(_)));

    let s = get(&store, "tehran").await;
    assert_eq!(s.seller_type, SellerType::Active);
    assert!(s.pre_restriction_seller_type.is_none());

    let last = job.last_report().unwrap();
    assert!(matches!(last.outcome, PassOutcome::Aborted { .. }));
    assert!(!job.is_running());
}

#[tokio::test]
async fn empty_catalog_aborts_by_default() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    let job = Reconciler::new(store.clone(), geocoder, ReconcileConfig::default());
    job.run_pass().await.unwrap();

    store.set_regions(Vec::new());
    assert!(matches!(job.run_pass().await, Err(ReconcileError::EmptyCatalog)));
    assert_eq!(get(&store, "tehran").await.seller_type, SellerType::Restricted);
}

#[tokio::test]
async fn empty_catalog_restores_when_configured() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Test, TEHRAN);
    let config = ReconcileConfig {
        abort_on_empty_catalog: false,
        ..ReconcileConfig::default()
    };
    let job = Reconciler::new(store.clone(), geocoder, config);
    job.run_pass().await.unwrap();

    store.set_regions(Vec::new());
    let report = job.run_pass().await.unwrap();
    assert_eq!(report.candidates, 1);
    let s = get(&store, "tehran").await;
    assert_eq!(s.seller_type, SellerType::Test);
    assert!(s.pre_restriction_seller_type.is_none());
}

#[tokio::test]
async fn overlapping_pass_is_rejected() {
    let (store, mut geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    let gate = Arc::new(Semaphore::new(0));
    geocoder.gate = Some(gate.clone());

    let job = Arc::new(Reconciler::new(store.clone(), geocoder, ReconcileConfig::default()));
    let first = tokio::spawn({
        let job = job.clone();
        async move { job.run_pass().await }
    });

    while !job.is_running() {
        tokio::task::yield_now().await;
    }
    assert!(matches!(job.run_pass().await, Err(ReconcileError::AlreadyRunning)));

    gate.add_permits(1);
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.sanctioned.len(), 1);
    assert!(!job.is_running());
}

#[tokio::test(start_paused = true)]
async fn scheduler_runs_pass_and_stops_on_shutdown() {
    let (store, geocoder) = setup();
    add_seller(&store, "tehran", VisibleType::Active, TEHRAN);
    let job = Arc::new(Reconciler::new(store.clone(), geocoder, ReconcileConfig::default()));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(run_daily(job.clone(), DailySchedule::DEFAULT, async move {
        let _ = rx.await;
    }));

    while job.last_report().is_none() {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    }
    tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(get(&store, "tehran").await.seller_type, SellerType::Restricted);
}
