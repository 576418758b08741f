//! Region catalog persistence operations on the `sanctioned_regions` table.
//!
//! Boundaries travel as GeoJSON in both directions (`ST_GeomFromGeoJSON` on
//! insert, `ST_AsGeoJSON` on read) and are validated by the core geometry
//! types when read back.

use sanctions_core::{sort_catalog, Boundary, GeoPoint, Jurisdiction, SanctionedRegion};
use sanctions_engine::StoreError;
use sqlx::PgPool;

const TABLE: &str = "sanctioned_regions";

/// Every region, in catalog order.
pub async fn list(pool: &PgPool) -> Result<Vec<SanctionedRegion>, StoreError> {
    let rows = sqlx::query_as::<_, RegionRow>(
        "SELECT location, ST_AsGeoJSON(boundary)::jsonb AS boundary
         FROM sanctioned_regions ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "failed to load region catalog");
        StoreError::backend("list_regions", e)
    })?;

    let mut regions = rows
        .into_iter()
        .map(RegionRow::into_region)
        .collect::<Result<Vec<_>, _>>()?;
    sort_catalog(&mut regions);
    Ok(regions)
}

/// Whether any cataloged boundary intersects the point.
pub async fn intersects_any(pool: &PgPool, point: GeoPoint) -> Result<bool, sqlx::Error> {
    let (hit,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (
             SELECT 1 FROM sanctioned_regions
             WHERE ST_Intersects(boundary, ST_SetSRID(ST_MakePoint($1, $2), 4326))
         )",
    )
    .bind(point.lon())
    .bind(point.lat())
    .fetch_one(pool)
    .await?;
    Ok(hit)
}

/// Number of cataloged regions.
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sanctioned_regions")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Insert regions in one statement.
pub async fn insert_all(pool: &PgPool, regions: &[SanctionedRegion]) -> Result<u64, sqlx::Error> {
    let locations: Vec<&str> = regions.iter().map(|r| r.location.as_str()).collect();
    let boundaries: Vec<String> = regions
        .iter()
        .map(|r| r.boundary.to_geojson().to_string())
        .collect();

    let result = sqlx::query(
        "INSERT INTO sanctioned_regions (location, boundary)
         SELECT l, ST_SetSRID(ST_GeomFromGeoJSON(b), 4326)
         FROM UNNEST($1::text[], $2::text[]) AS r(l, b)",
    )
    .bind(&locations)
    .bind(&boundaries)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RegionRow {
    location: String,
    boundary: serde_json::Value,
}

impl RegionRow {
    fn into_region(self) -> Result<SanctionedRegion, StoreError> {
        let location: Jurisdiction = self.location.parse().map_err(|e| StoreError::Corrupt {
            table: TABLE,
            reason: format!("{e}"),
        })?;
        let boundary: Boundary = serde_json::from_value(self.boundary).map_err(|e| StoreError::Corrupt {
            table: TABLE,
            reason: format!("{location}: invalid boundary: {e}"),
        })?;
        Ok(SanctionedRegion::new(location, boundary))
    }
}
