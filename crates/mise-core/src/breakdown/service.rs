//! Database-facing entry points for breakdown generation and saving.
//!
//! [`generate_task_breakdown`] loads event context and delegates to the
//! generator; [`save_task_breakdown_for_event`] wraps the Postgres store.
//! Both are thin: the interesting logic lives in [`generate`](super::generate)
//! and [`persist`](crate::persist), where it can be tested without a pool.

use anyhow::{Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use mise_db::queries::events;

use super::TaskBreakdown;
use super::generate::generate_with_completion;
use crate::completion::CompletionService;
use crate::persist::{PgPrepTaskStore, SaveBreakdownError, SaveReport, save_task_breakdown};

/// Generate a breakdown for a stored event.
///
/// Loads the event, its menu, and up to five comparable past events, then
/// runs the AI-backed generator (which degrades to the rule-based roster on
/// its own). Fails only when the event itself cannot be loaded.
pub async fn generate_task_breakdown(
    pool: &PgPool,
    completion: &dyn CompletionService,
    tenant_id: Uuid,
    event_id: Uuid,
    custom_instructions: Option<&str>,
) -> Result<TaskBreakdown> {
    let Some(event) = events::get_event(pool, tenant_id, event_id).await? else {
        bail!("event {event_id} not found");
    };

    let similar = events::find_similar_events(
        pool,
        tenant_id,
        event_id,
        &event.event_type,
        event.guest_count,
    )
    .await?;
    let dishes = events::list_event_dishes(pool, tenant_id, event_id).await?;

    tracing::debug!(
        %event_id,
        dishes = dishes.len(),
        similar_events = similar.len(),
        backend = completion.name(),
        "generating task breakdown"
    );

    Ok(generate_with_completion(completion, &event, &dishes, &similar, custom_instructions).await)
}

/// Save a breakdown's tasks for an event through the Postgres store.
///
/// `location_id` is required: callers decide which location new tasks land
/// at (typically via `find_default_location`), never this layer.
pub async fn save_task_breakdown_for_event(
    pool: &PgPool,
    tenant_id: Uuid,
    event_id: Uuid,
    location_id: Uuid,
    breakdown: &TaskBreakdown,
) -> Result<SaveReport, SaveBreakdownError> {
    let store = PgPrepTaskStore::new(pool.clone());
    save_task_breakdown(&store, tenant_id, event_id, location_id, breakdown).await
}
