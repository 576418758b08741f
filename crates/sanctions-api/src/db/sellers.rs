//! Seller persistence operations on the `sellers` table.
//!
//! Each reconciliation phase is a single `UPDATE ... FROM UNNEST(...)`
//! statement. Specs are applied independently by the join; a spec whose
//! seller is missing simply does not join and is reported back as failed.

use std::collections::HashSet;

use sanctions_core::{GeoPoint, SellerId};
use sanctions_engine::{CandidateQuery, StoreError};
use sanctions_state::{BulkWriteOutcome, SellerRecord, SellerUpdate, SpecFailure};
use sqlx::PgPool;

const TABLE: &str = "sellers";

const RESET_SQL: &str = "UPDATE sellers SET
         is_pre_restricted = FALSE,
         pre_restriction_seller_type = CASE
             WHEN seller_type = 'restricted' THEN pre_restriction_seller_type END,
         updated_at = now()
     WHERE is_pre_restricted
        OR (seller_type <> 'restricted' AND pre_restriction_seller_type IS NOT NULL)";

const SELECT_COLUMNS: &str = "SELECT seller_id, seller_type, pre_restriction_seller_type, is_pre_restricted,
        ST_X(sell_map_center) AS lon, ST_Y(sell_map_center) AS lat
 FROM sellers";

/// Clear `is_pre_restricted` wherever it is set, and the backup type of
/// every seller that is not restricted.
pub async fn reset_pre_restricted(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(RESET_SQL)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Sellers located within the union of the query's boundaries, or
/// currently restricted.
pub async fn find_candidates(pool: &PgPool, query: &CandidateQuery) -> Result<Vec<SellerRecord>, StoreError> {
    let rows = sqlx::query_as::<_, SellerRow>(&format!(
        "{SELECT_COLUMNS}
         WHERE seller_type = 'restricted'
            OR ST_Intersects(sell_map_center, ST_SetSRID(ST_GeomFromGeoJSON($1), 4326))"
    ))
    .bind(query.geometry_collection().to_string())
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "candidate query failed");
        StoreError::backend("find_candidates", e)
    })?;

    rows.into_iter().map(SellerRow::into_record).collect()
}

/// Column arrays bound to the `UNNEST` in [`bulk_update`], index-aligned.
fn spec_arrays(updates: &[SellerUpdate]) -> (Vec<&str>, Vec<&'static str>, Vec<Option<&'static str>>) {
    let ids = updates.iter().map(|u| u.seller_id.as_str()).collect();
    let ops = updates.iter().map(|u| u.op.kind()).collect();
    let type_args = updates
        .iter()
        .map(|u| u.op.type_arg().map(|t| t.as_str()))
        .collect();
    (ids, ops, type_args)
}

/// Apply a phase's specs as one statement.
pub async fn bulk_update(pool: &PgPool, updates: &[SellerUpdate]) -> Result<BulkWriteOutcome, sqlx::Error> {
    let mut outcome = BulkWriteOutcome {
        requested: updates.len(),
        ..BulkWriteOutcome::default()
    };
    if updates.is_empty() {
        return Ok(outcome);
    }

    let (ids, ops, type_args) = spec_arrays(updates);

    // `o` is read under the statement snapshot, so it still holds the
    // pre-update values when RETURNING compares against it.
    let rows: Vec<(String, bool)> = sqlx::query_as(
        "WITH spec AS (
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[]) AS s(seller_id, op, type_arg)
         )
         UPDATE sellers AS t SET
             is_pre_restricted = CASE WHEN s.op = 'mark' THEN TRUE ELSE t.is_pre_restricted END,
             seller_type = CASE s.op
                 WHEN 'restrict' THEN 'restricted'
                 WHEN 'restore' THEN s.type_arg
                 ELSE t.seller_type END,
             pre_restriction_seller_type = CASE s.op
                 WHEN 'mark' THEN COALESCE(s.type_arg, t.pre_restriction_seller_type)
                 WHEN 'restrict' THEN s.type_arg
                 ELSE NULL END,
             updated_at = now()
         FROM spec AS s
         JOIN sellers AS o ON o.seller_id = s.seller_id
         WHERE t.seller_id = s.seller_id
         RETURNING t.seller_id,
             (t.seller_type, t.pre_restriction_seller_type, t.is_pre_restricted)
                 IS DISTINCT FROM
             (o.seller_type, o.pre_restriction_seller_type, o.is_pre_restricted)",
    )
    .bind(&ids)
    .bind(&ops)
    .bind(&type_args)
    .fetch_all(pool)
    .await?;

    let found: HashSet<&str> = rows.iter().map(|(id, _)| id.as_str()).collect();
    outcome.matched = rows.len();
    outcome.modified = rows.iter().filter(|(_, changed)| *changed).count();
    outcome.failed = updates
        .iter()
        .filter(|u| !found.contains(u.seller_id.as_str()))
        .map(|u| SpecFailure {
            seller_id: u.seller_id.clone(),
            reason: "seller not found".into(),
        })
        .collect();
    Ok(outcome)
}

/// Every seller.
pub async fn list_all(pool: &PgPool) -> Result<Vec<SellerRecord>, StoreError> {
    let rows = sqlx::query_as::<_, SellerRow>(&format!("{SELECT_COLUMNS} ORDER BY seller_id"))
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::backend("list_sellers", e))?;

    rows.into_iter().map(SellerRow::into_record).collect()
}

/// Fetch one seller by id.
pub async fn get(pool: &PgPool, seller_id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
    let row = sqlx::query_as::<_, SellerRow>(&format!("{SELECT_COLUMNS} WHERE seller_id = $1"))
        .bind(seller_id.as_str())
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::backend("get_seller", e))?;

    row.map(SellerRow::into_record).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SellerRow {
    seller_id: String,
    seller_type: String,
    pre_restriction_seller_type: Option<String>,
    is_pre_restricted: bool,
    lon: f64,
    lat: f64,
}

impl SellerRow {
    /// Convert to the domain record. A restricted row without a backup is
    /// still returned; the verifier reports it as corrupt.
    fn into_record(self) -> Result<SellerRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            table: TABLE,
            reason,
        };
        let seller_id = SellerId::new(self.seller_id).map_err(|e| corrupt(e.to_string()))?;
        let seller_type = self
            .seller_type
            .parse()
            .map_err(|e| corrupt(format!("{seller_id}: {e}")))?;
        let pre_restriction_seller_type = self
            .pre_restriction_seller_type
            .map(|t| t.parse())
            .transpose()
            .map_err(|e| corrupt(format!("{seller_id}: {e}")))?;
        let sell_map_center =
            GeoPoint::new(self.lon, self.lat).map_err(|e| corrupt(format!("{seller_id}: {e}")))?;

        Ok(SellerRecord {
            seller_id,
            seller_type,
            pre_restriction_seller_type,
            is_pre_restricted: self.is_pre_restricted,
            sell_map_center,
        })
    }
}
