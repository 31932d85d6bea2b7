//! Loose row decoding for the summary read path.
//!
//! The raw query result is decoded cell-by-cell into [`RawValue`]s rather
//! than straight into a typed struct, then pushed through
//! [`validate_prep_tasks`]. That keeps the contract check honest: the typed
//! projection only exists after the validator has accepted the rows, on
//! every read.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{PrepTaskSummary, RawValue, validate_prep_tasks};

fn text_cell(row: &PgRow, col: &str) -> RawValue {
    match row.try_get::<String, _>(col) {
        Ok(s) => RawValue::Text(s),
        Err(_) => RawValue::Null,
    }
}

/// Decode a cell that ought to be numeric, preserving whatever
/// representation the driver hands back.
fn number_cell(row: &PgRow, col: &str) -> RawValue {
    if let Ok(n) = row.try_get::<i32, _>(col) {
        return RawValue::Number(f64::from(n));
    }
    if let Ok(n) = row.try_get::<i64, _>(col) {
        return RawValue::Number(n as f64);
    }
    if let Ok(n) = row.try_get::<f64, _>(col) {
        return RawValue::Number(n);
    }
    if let Ok(s) = row.try_get::<String, _>(col) {
        return RawValue::Text(s);
    }
    RawValue::Null
}

fn nullable_number_cell(row: &PgRow, col: &str) -> RawValue {
    match row.try_get::<Option<i32>, _>(col) {
        Ok(Some(n)) => RawValue::Number(f64::from(n)),
        Ok(None) => RawValue::Null,
        Err(_) => number_cell(row, col),
    }
}

fn timestamp_cell(row: &PgRow, col: &str) -> RawValue {
    match row.try_get::<DateTime<Utc>, _>(col) {
        Ok(ts) => RawValue::Timestamp(ts),
        Err(_) => RawValue::Null,
    }
}

fn bool_cell(row: &PgRow, col: &str) -> RawValue {
    match row.try_get::<bool, _>(col) {
        Ok(b) => RawValue::Bool(b),
        Err(_) => RawValue::Null,
    }
}

fn decode_row(row: &PgRow) -> RawValue {
    RawValue::Object(BTreeMap::from([
        ("id".to_string(), text_cell(row, "id")),
        ("name".to_string(), text_cell(row, "name")),
        ("status".to_string(), text_cell(row, "status")),
        (
            "quantityTotal".to_string(),
            number_cell(row, "quantity_total"),
        ),
        (
            "servingsTotal".to_string(),
            nullable_number_cell(row, "servings_total"),
        ),
        ("dueByDate".to_string(), timestamp_cell(row, "due_by_date")),
        (
            "isEventFinish".to_string(),
            bool_cell(row, "is_event_finish"),
        ),
    ]))
}

/// Fetch and contract-validate the prep-task summaries for an event.
///
/// Contract violations propagate as errors; they indicate drift between the
/// query and the schema, not bad user input.
pub async fn fetch_prep_task_summaries(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
) -> Result<Vec<PrepTaskSummary>> {
    let rows = sqlx::query(
        "SELECT id, name, status, quantity_total, servings_total, \
                due_by_date, is_event_finish \
         FROM prep_tasks \
         WHERE tenant_id = $1 AND event_id = $2 AND deleted_at IS NULL \
         ORDER BY due_by_date ASC, created_at ASC",
    )
    .bind(tenant_id)
    .bind(event_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch prep task summary rows")?;

    let raw = RawValue::Array(rows.iter().map(decode_row).collect());
    let summaries = validate_prep_tasks(&raw)?;
    Ok(summaries)
}
