//! Saving a breakdown as schedulable prep task rows.
//!
//! Tasks are flattened in section order (prep, setup, cleanup) and inserted
//! one at a time, deliberately outside a transaction: a failure partway
//! through leaves the earlier rows committed, and the error reports exactly
//! which ids made it so the caller can resume or reconcile instead of
//! regenerating from scratch.

use anyhow::Result;
use async_trait::async_trait;
use mise_db::models::{NewPrepTask, PrepTask, PrepTaskStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::breakdown::{TaskBreakdown, TaskBreakdownItem};
use crate::schedule::resolve_schedule;

/// Priority assigned to tasks flagged critical by the generator.
const CRITICAL_PRIORITY: i32 = 8;

/// Priority for everything else.
const DEFAULT_PRIORITY: i32 = 5;

/// Storage seam for prep task rows. Production code uses [`PgPrepTaskStore`];
/// tests substitute in-memory implementations to exercise partial-failure
/// behavior without a database.
#[async_trait]
pub trait PrepTaskStore: Send + Sync {
    async fn insert_prep_task(&self, task: &NewPrepTask) -> Result<PrepTask>;
}

// Compile-time assertion: PrepTaskStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PrepTaskStore) {}
};

/// The Postgres-backed store, a thin delegate to the query layer.
#[derive(Clone)]
pub struct PgPrepTaskStore {
    pool: PgPool,
}

impl PgPrepTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrepTaskStore for PgPrepTaskStore {
    async fn insert_prep_task(&self, task: &NewPrepTask) -> Result<PrepTask> {
        mise_db::queries::prep_tasks::insert_prep_task(&self.pool, task).await
    }
}

/// Outcome of a fully successful save.
#[derive(Debug)]
pub struct SaveReport {
    /// Rows as persisted, in insertion order.
    pub created: Vec<PrepTask>,
}

/// A save that stopped partway. The rows named in `created_ids` are
/// committed and remain in the database; `task_id` is the task whose insert
/// failed, and nothing after it was attempted.
#[derive(Debug, thiserror::Error)]
#[error(
    "failed to save task '{task_id}' ({created} of {total} tasks were created before the failure)",
    created = .created_ids.len()
)]
pub struct SaveBreakdownError {
    pub task_id: String,
    pub created_ids: Vec<String>,
    pub total: usize,
    #[source]
    pub source: anyhow::Error,
}

fn to_new_prep_task(
    item: &TaskBreakdownItem,
    breakdown: &TaskBreakdown,
    tenant_id: Uuid,
    event_id: Uuid,
    location_id: Uuid,
) -> NewPrepTask {
    let schedule = resolve_schedule(item.relative_time.as_deref(), breakdown.event_date);
    NewPrepTask {
        id: item.id.clone(),
        tenant_id,
        event_id,
        location_id,
        task_type: item.section,
        name: item.name.clone(),
        quantity_total: breakdown.guest_count,
        servings_total: Some(breakdown.guest_count),
        start_by_date: schedule.start_by,
        due_by_date: schedule.due_by,
        estimated_minutes: item.duration_minutes,
        status: PrepTaskStatus::Pending,
        priority: if item.is_critical {
            CRITICAL_PRIORITY
        } else {
            DEFAULT_PRIORITY
        },
        notes: item.description.clone(),
    }
}

/// Persist every task in `breakdown` for `event_id`, resolving each task's
/// schedule from its relative-time phrase and the breakdown's event date.
///
/// `location_id` must be supplied by the caller; this layer never guesses a
/// location on its own.
pub async fn save_task_breakdown(
    store: &dyn PrepTaskStore,
    tenant_id: Uuid,
    event_id: Uuid,
    location_id: Uuid,
    breakdown: &TaskBreakdown,
) -> Result<SaveReport, SaveBreakdownError> {
    let total = breakdown.task_count();
    let mut created: Vec<PrepTask> = Vec::with_capacity(total);

    for item in breakdown.all_tasks() {
        let new_task = to_new_prep_task(item, breakdown, tenant_id, event_id, location_id);
        match store.insert_prep_task(&new_task).await {
            Ok(row) => created.push(row),
            Err(source) => {
                let created_ids: Vec<String> = created.into_iter().map(|t| t.id).collect();
                tracing::error!(
                    task_id = %item.id,
                    created = created_ids.len(),
                    total,
                    "breakdown save stopped partway"
                );
                return Err(SaveBreakdownError {
                    task_id: item.id.clone(),
                    created_ids,
                    total,
                    source,
                });
            }
        }
    }

    tracing::info!(%event_id, tasks = created.len(), "saved task breakdown");
    Ok(SaveReport { created })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mise_db::models::TaskSection;
    use std::sync::Mutex;

    /// In-memory store that can be told to fail on the Nth insert (1-based).
    struct MemStore {
        rows: Mutex<Vec<NewPrepTask>>,
        fail_on: Option<usize>,
    }

    impl MemStore {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl PrepTaskStore for MemStore {
        async fn insert_prep_task(&self, task: &NewPrepTask) -> Result<PrepTask> {
            let mut rows = self.rows.lock().unwrap();
            if self.fail_on == Some(rows.len() + 1) {
                return Err(anyhow!("simulated insert failure"));
            }
            rows.push(task.clone());
            Ok(PrepTask {
                id: task.id.clone(),
                tenant_id: task.tenant_id,
                event_id: task.event_id,
                location_id: task.location_id,
                task_type: task.task_type,
                name: task.name.clone(),
                quantity_total: task.quantity_total,
                servings_total: task.servings_total,
                start_by_date: task.start_by_date,
                due_by_date: task.due_by_date,
                estimated_minutes: task.estimated_minutes,
                status: task.status,
                priority: task.priority,
                is_event_finish: false,
                notes: task.notes.clone(),
                created_at: Utc::now(),
            })
        }
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, 18, 0, 0).unwrap()
    }

    fn item(section: TaskSection, index: usize, critical: bool) -> TaskBreakdownItem {
        TaskBreakdownItem {
            id: format!("{section}-{index}-1700000000000"),
            name: format!("{section} task {index}"),
            description: Some("details".to_string()),
            section,
            duration_minutes: 30,
            start_time: None,
            end_time: None,
            relative_time: Some("24 hours before event".to_string()),
            station: None,
            assignment: None,
            ingredients: None,
            steps: None,
            is_critical: critical,
            due_in_hours: None,
            confidence: Some(0.7),
        }
    }

    fn breakdown() -> TaskBreakdown {
        TaskBreakdown::assemble(
            vec![
                item(TaskSection::Prep, 1, true),
                item(TaskSection::Prep, 2, false),
            ],
            vec![item(TaskSection::Setup, 1, false)],
            vec![
                item(TaskSection::Cleanup, 1, false),
                item(TaskSection::Cleanup, 2, false),
            ],
            80,
            when(),
            when(),
            0,
        )
    }

    #[tokio::test]
    async fn save_flattens_in_section_order() {
        let store = MemStore::new(None);
        let report = save_task_breakdown(
            &store,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &breakdown(),
        )
        .await
        .unwrap();

        assert_eq!(report.created.len(), 5);
        let sections: Vec<TaskSection> = report.created.iter().map(|t| t.task_type).collect();
        assert_eq!(
            sections,
            vec![
                TaskSection::Prep,
                TaskSection::Prep,
                TaskSection::Setup,
                TaskSection::Cleanup,
                TaskSection::Cleanup,
            ]
        );
    }

    #[tokio::test]
    async fn save_maps_item_fields_onto_rows() {
        let store = MemStore::new(None);
        let tenant_id = Uuid::new_v4();
        let event_id = Uuid::new_v4();
        let location_id = Uuid::new_v4();
        let b = breakdown();
        save_task_breakdown(&store, tenant_id, event_id, location_id, &b)
            .await
            .unwrap();

        let rows = store.rows.lock().unwrap();
        let critical = &rows[0];
        assert_eq!(critical.tenant_id, tenant_id);
        assert_eq!(critical.event_id, event_id);
        assert_eq!(critical.location_id, location_id);
        assert_eq!(critical.priority, CRITICAL_PRIORITY);
        assert_eq!(critical.status, PrepTaskStatus::Pending);
        assert_eq!(critical.quantity_total, 80);
        assert_eq!(critical.servings_total, Some(80));
        assert_eq!(critical.notes.as_deref(), Some("details"));
        // "24 hours before event" resolves against the event date.
        assert_eq!(critical.due_by_date, when() - Duration::hours(24));

        assert_eq!(rows[1].priority, DEFAULT_PRIORITY);
    }

    #[tokio::test]
    async fn failure_on_third_insert_reports_two_created() {
        let store = MemStore::new(Some(3));
        let err = save_task_breakdown(
            &store,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &breakdown(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.created_ids.len(), 2);
        assert_eq!(err.task_id, "setup-1-1700000000000");
        assert_eq!(err.total, 5);
        assert!(err.created_ids.iter().all(|id| id.starts_with("prep-")));
        // The committed rows stay committed.
        assert_eq!(store.rows.lock().unwrap().len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("setup-1-1700000000000"));
        assert!(msg.contains("2 of 5"));
    }

    #[tokio::test]
    async fn failure_on_first_insert_reports_none_created() {
        let store = MemStore::new(Some(1));
        let err = save_task_breakdown(
            &store,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &breakdown(),
        )
        .await
        .unwrap_err();
        assert!(err.created_ids.is_empty());
        assert_eq!(err.task_id, "prep-1-1700000000000");
    }

    #[tokio::test]
    async fn empty_breakdown_saves_nothing() {
        let store = MemStore::new(None);
        let empty = TaskBreakdown::assemble(vec![], vec![], vec![], 10, when(), when(), 0);
        let report = save_task_breakdown(
            &store,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &empty,
        )
        .await
        .unwrap();
        assert!(report.created.is_empty());
    }
}
