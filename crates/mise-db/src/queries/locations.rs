//! Database query functions for the `locations` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Location;

/// Insert a new location row.
pub async fn insert_location(pool: &PgPool, tenant_id: Uuid, name: &str) -> Result<Location> {
    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (tenant_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(tenant_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .context("failed to insert location")?;

    Ok(location)
}

/// Resolve the tenant's default location: the oldest non-deleted one.
///
/// Returns `None` when the tenant has no locations. Callers decide what to
/// do about that -- task persistence requires an explicit location id and
/// refuses to guess.
pub async fn find_default_location(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM locations \
         WHERE tenant_id = $1 AND deleted_at IS NULL \
         ORDER BY created_at ASC \
         LIMIT 1",
    )
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
    .context("failed to resolve default location")?;

    Ok(row.map(|(id,)| id))
}
