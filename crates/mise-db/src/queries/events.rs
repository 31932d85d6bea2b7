//! Database query functions for the `events` and `event_dishes` tables.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventDish, SimilarEvent};

/// Fetch a single event by tenant and id. Soft-deleted events are invisible.
pub async fn get_event(pool: &PgPool, tenant_id: Uuid, event_id: Uuid) -> Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
    )
    .bind(tenant_id)
    .bind(event_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch event")?;

    Ok(event)
}

/// Insert a new event row. Returns the inserted event with server-generated
/// defaults (id, created_at).
#[allow(clippy::too_many_arguments)]
pub async fn insert_event(
    pool: &PgPool,
    tenant_id: Uuid,
    title: &str,
    event_type: &str,
    event_date: chrono::DateTime<chrono::Utc>,
    guest_count: i32,
    venue_name: Option<&str>,
    notes: Option<&str>,
) -> Result<Event> {
    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events (tenant_id, title, event_type, event_date, guest_count, venue_name, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(tenant_id)
    .bind(title)
    .bind(event_type)
    .bind(event_date)
    .bind(guest_count)
    .bind(venue_name)
    .bind(notes)
    .fetch_one(pool)
    .await
    .context("failed to insert event")?;

    Ok(event)
}

/// Find up to 5 past events usable as generation context: same event type,
/// guest count within +/-10 of the reference event, most recent first.
pub async fn find_similar_events(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
    event_type: &str,
    guest_count: i32,
) -> Result<Vec<SimilarEvent>> {
    let events = sqlx::query_as::<_, SimilarEvent>(
        "SELECT id, title, event_date, guest_count \
         FROM events \
         WHERE tenant_id = $1 \
           AND id != $2 \
           AND deleted_at IS NULL \
           AND event_type = $3 \
           AND ABS(guest_count - $4) <= 10 \
         ORDER BY event_date DESC \
         LIMIT 5",
    )
    .bind(tenant_id)
    .bind(event_id)
    .bind(event_type)
    .bind(guest_count)
    .fetch_all(pool)
    .await
    .context("failed to find similar events")?;

    Ok(events)
}

/// List the dishes linked to an event's menu, in link-creation order.
pub async fn list_event_dishes(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
) -> Result<Vec<EventDish>> {
    let dishes = sqlx::query_as::<_, EventDish>(
        "SELECT link_id, event_id, name, category, course, quantity_servings, \
                dietary_tags, allergens \
         FROM event_dishes \
         WHERE tenant_id = $1 AND event_id = $2 AND deleted_at IS NULL \
         ORDER BY created_at ASC",
    )
    .bind(tenant_id)
    .bind(event_id)
    .fetch_all(pool)
    .await
    .context("failed to list event dishes")?;

    Ok(dishes)
}

/// Link a dish to an event's menu.
#[allow(clippy::too_many_arguments)]
pub async fn insert_event_dish(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
    name: &str,
    category: Option<&str>,
    course: Option<&str>,
    quantity_servings: i32,
    dietary_tags: &[String],
    allergens: &[String],
) -> Result<EventDish> {
    let dish = sqlx::query_as::<_, EventDish>(
        "INSERT INTO event_dishes \
             (tenant_id, event_id, name, category, course, quantity_servings, dietary_tags, allergens) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING link_id, event_id, name, category, course, quantity_servings, \
                   dietary_tags, allergens",
    )
    .bind(tenant_id)
    .bind(event_id)
    .bind(name)
    .bind(category)
    .bind(course)
    .bind(quantity_servings)
    .bind(dietary_tags)
    .bind(allergens)
    .fetch_one(pool)
    .await
    .context("failed to insert event dish")?;

    Ok(dish)
}
