//! Database query functions for the `prep_tasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewPrepTask, PrepTask, PrepTaskStatus};

/// Insert a single prep task row. Returns the inserted record with
/// server-generated defaults (created_at, is_event_finish).
pub async fn insert_prep_task(pool: &PgPool, record: &NewPrepTask) -> Result<PrepTask> {
    let task = sqlx::query_as::<_, PrepTask>(
        "INSERT INTO prep_tasks \
             (id, tenant_id, event_id, location_id, task_type, name, \
              quantity_total, servings_total, start_by_date, due_by_date, \
              estimated_minutes, status, priority, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING *",
    )
    .bind(&record.id)
    .bind(record.tenant_id)
    .bind(record.event_id)
    .bind(record.location_id)
    .bind(record.task_type)
    .bind(&record.name)
    .bind(record.quantity_total)
    .bind(record.servings_total)
    .bind(record.start_by_date)
    .bind(record.due_by_date)
    .bind(record.estimated_minutes)
    .bind(record.status)
    .bind(record.priority)
    .bind(&record.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert prep task {:?}", record.id))?;

    Ok(task)
}

/// Fetch a single prep task by id.
pub async fn get_prep_task(pool: &PgPool, tenant_id: Uuid, id: &str) -> Result<Option<PrepTask>> {
    let task = sqlx::query_as::<_, PrepTask>(
        "SELECT * FROM prep_tasks \
         WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch prep task")?;

    Ok(task)
}

/// List all prep tasks for an event, due-date order (ties broken by
/// creation time). This is the read path the summary projection runs over.
pub async fn list_prep_tasks_for_event(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
) -> Result<Vec<PrepTask>> {
    let tasks = sqlx::query_as::<_, PrepTask>(
        "SELECT * FROM prep_tasks \
         WHERE tenant_id = $1 AND event_id = $2 AND deleted_at IS NULL \
         ORDER BY due_by_date ASC, created_at ASC",
    )
    .bind(tenant_id)
    .bind(event_id)
    .fetch_all(pool)
    .await
    .context("failed to list prep tasks for event")?;

    Ok(tasks)
}

/// Count non-deleted prep tasks for an event.
pub async fn count_prep_tasks_for_event(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM prep_tasks \
         WHERE tenant_id = $1 AND event_id = $2 AND deleted_at IS NULL",
    )
    .bind(tenant_id)
    .bind(event_id)
    .fetch_one(pool)
    .await
    .context("failed to count prep tasks")?;

    Ok(row.0)
}

/// Update the status of a prep task.
pub async fn update_prep_task_status(
    pool: &PgPool,
    tenant_id: Uuid,
    id: &str,
    status: PrepTaskStatus,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE prep_tasks SET status = $1 \
         WHERE tenant_id = $2 AND id = $3 AND deleted_at IS NULL",
    )
    .bind(status)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await
    .context("failed to update prep task status")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("prep task {id:?} not found");
    }

    Ok(())
}
