//! PostGIS store behaviour, checked against the in-memory store.
//!
//! Needs a Postgres database with the PostGIS extension available. Runs only
//! when `DATABASE_URL` is set; otherwise the test returns immediately.
//! Everything runs in one test because the reset step touches the whole
//! table.

use sanctions_api::db::PgStore;
use sanctions_core::{default_regions, GeoPoint, SellerId};
use sanctions_engine::{CandidateQuery, MemoryStore, RegionCatalog, SellerStore};
use sanctions_state::{
    plan_phase_a, SellerRecord, SellerType, SellerUpdate, UpdateOp, VisibleType,
};
use sqlx::PgPool;

const TEHRAN: (f64, f64) = (35.69, 51.39);
const HAVANA: (f64, f64) = (23.11, -82.37);
const LISBON: (f64, f64) = (38.72, -9.14);

fn record(
    id: &str,
    seller_type: SellerType,
    pre: Option<VisibleType>,
    at: (f64, f64),
) -> SellerRecord {
    SellerRecord {
        seller_id: SellerId::new(id).unwrap(),
        seller_type,
        pre_restriction_seller_type: pre,
        is_pre_restricted: false,
        sell_map_center: GeoPoint::from_lat_lon(at.0, at.1).unwrap(),
    }
}

async fn insert(pool: &PgPool, r: &SellerRecord) {
    sqlx::query(
        "INSERT INTO sellers (seller_id, seller_type, pre_restriction_seller_type, sell_map_center)
         VALUES ($1, $2, $3, ST_SetSRID(ST_MakePoint($4, $5), 4326))",
    )
    .bind(r.seller_id.as_str())
    .bind(r.seller_type.as_str())
    .bind(r.pre_restriction_seller_type.map(|t| t.as_str()))
    .bind(r.sell_map_center.lon())
    .bind(r.sell_map_center.lat())
    .execute(pool)
    .await
    .unwrap();
}

async fn assert_same(pg: &PgStore, mem: &MemoryStore, ids: &[SellerId]) {
    for id in ids {
        assert_eq!(
            pg.get(id).await.unwrap(),
            mem.get(id).await.unwrap(),
            "stores disagree on {id}"
        );
    }
}

#[tokio::test]
async fn pg_store_matches_memory_store_across_a_pass() {
    let Some(pool) = sanctions_api::db::init_pool().await.unwrap() else {
        return;
    };
    let pg = PgStore::new(pool.clone());
    let catalog = default_regions().unwrap();
    pg.seed_regions_if_empty(&catalog).await.unwrap();

    let prefix = format!(
        "pgtest-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );
    let name = |s: &str| format!("{prefix}-{s}");
    let sellers = vec![
        record(&name("tehran"), SellerType::Active, None, TEHRAN),
        record(
            &name("havana"),
            SellerType::Restricted,
            Some(VisibleType::Test),
            HAVANA,
        ),
        record(
            &name("stale"),
            SellerType::Active,
            Some(VisibleType::Active),
            LISBON,
        ),
        record(&name("lisbon"), SellerType::Inactive, None, LISBON),
    ];
    let ids: Vec<SellerId> = sellers.iter().map(|s| s.seller_id.clone()).collect();

    let mem = MemoryStore::with_regions(catalog);
    for s in &sellers {
        insert(&pool, s).await;
        mem.insert_seller(s.clone());
    }

    // Step 1: the stale backup of a visible seller is dropped.
    pg.reset_pre_restricted().await.unwrap();
    mem.reset_pre_restricted().await.unwrap();
    assert_same(&pg, &mem, &ids).await;
    let stale = pg.get(&ids[2]).await.unwrap().unwrap();
    assert_eq!(stale.pre_restriction_seller_type, None);

    // Candidates: inside a region, or already restricted.
    let query = CandidateQuery::from_regions(&pg.list_regions().await.unwrap());
    let mut candidates: Vec<SellerRecord> = pg
        .find_candidates(&query)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.seller_id.as_str().starts_with(&prefix))
        .collect();
    candidates.sort_by(|a, b| a.seller_id.cmp(&b.seller_id));
    let candidate_ids: Vec<&SellerId> = candidates.iter().map(|s| &s.seller_id).collect();
    assert_eq!(candidate_ids, vec![&ids[1], &ids[0]]);

    // Phase A.
    let phase_a = plan_phase_a(&candidates);
    let pg_outcome = pg.bulk_update(&phase_a).await.unwrap();
    let mem_outcome = mem.bulk_update(&phase_a).await.unwrap();
    assert_eq!(pg_outcome, mem_outcome);
    assert_eq!(pg_outcome.matched, 2);
    assert_same(&pg, &mem, &ids).await;
    let havana = pg.get(&ids[1]).await.unwrap().unwrap();
    assert!(havana.is_pre_restricted);
    assert_eq!(havana.pre_restriction_seller_type, Some(VisibleType::Test));

    // Phase B, with one spec for a seller that does not exist.
    let ghost = SellerId::new(name("ghost")).unwrap();
    let phase_b = vec![
        SellerUpdate {
            seller_id: ids[0].clone(),
            op: UpdateOp::Restrict {
                previous: VisibleType::Active,
            },
        },
        SellerUpdate {
            seller_id: ids[1].clone(),
            op: UpdateOp::Restore {
                to: VisibleType::Test,
            },
        },
        SellerUpdate {
            seller_id: ghost.clone(),
            op: UpdateOp::Restore {
                to: VisibleType::Active,
            },
        },
    ];
    let pg_outcome = pg.bulk_update(&phase_b).await.unwrap();
    let mem_outcome = mem.bulk_update(&phase_b).await.unwrap();
    assert_eq!(pg_outcome, mem_outcome);
    assert_eq!(pg_outcome.modified, 2);
    assert_eq!(pg_outcome.failed.len(), 1);
    assert_eq!(pg_outcome.failed[0].seller_id, ghost);
    assert_same(&pg, &mem, &ids).await;

    // Re-applying changes nothing.
    let again = pg.bulk_update(&phase_b).await.unwrap();
    assert_eq!(again.modified, 0);

    sqlx::query("DELETE FROM sellers WHERE seller_id LIKE $1")
        .bind(format!("{prefix}-%"))
        .execute(&pool)
        .await
        .unwrap();
}
