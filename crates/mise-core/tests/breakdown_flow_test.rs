//! End-to-end integration test: generate a breakdown for a stored event,
//! save it, read the rows back through the summary projection, and export.
//!
//! Requires PostgreSQL via `mise-test-utils` (external server through
//! `MISE_TEST_PG_URL`, or a testcontainers instance).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mise_core::breakdown::service::{generate_task_breakdown, save_task_breakdown_for_event};
use mise_core::completion::CompletionService;
use mise_core::contract::fetch_prep_task_summaries;
use mise_core::export::breakdown_to_csv;
use mise_db::models::PrepTaskStatus;
use mise_db::queries::{events, locations, prep_tasks};
use mise_test_utils::{create_test_db, drop_test_db};

struct CannedCompletion(&'static str);

#[async_trait]
impl CompletionService for CannedCompletion {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

const RESPONSE: &str = r#"```json
{
  "prep": [
    {"name": "Brine chicken", "durationMinutes": 45, "relativeTime": "24 hours before event", "isCritical": true, "dueInHours": 24},
    {"name": "Chop crudites", "durationMinutes": 60, "relativeTime": "6 hours before event"}
  ],
  "setup": [
    {"name": "Set buffet line", "durationMinutes": 40, "relativeTime": "2 hours before event"}
  ],
  "cleanup": [
    {"name": "Wash and store equipment", "durationMinutes": 50, "relativeTime": "After service"}
  ]
}
```"#;

async fn seed(pool: &PgPool, tenant_id: Uuid) -> (Uuid, Uuid) {
    let location = locations::insert_location(pool, tenant_id, "Commissary")
        .await
        .expect("location insert");
    let event = events::insert_event(
        pool,
        tenant_id,
        "Summer Gala",
        "gala",
        Utc::now() + Duration::days(10),
        80,
        Some("Lakeside Pavilion"),
        Some("Plated dinner"),
    )
    .await
    .expect("event insert");
    events::insert_event_dish(
        pool,
        tenant_id,
        event.id,
        "Roast chicken",
        Some("main"),
        Some("dinner"),
        80,
        &[],
        &["dairy".to_string()],
    )
    .await
    .expect("dish insert");
    (event.id, location.id)
}

#[tokio::test]
async fn generate_save_and_read_back() {
    let (pool, db_name) = create_test_db().await;
    let tenant_id = Uuid::new_v4();
    let (event_id, location_id) = seed(&pool, tenant_id).await;

    let completion = CannedCompletion(RESPONSE);
    let breakdown = generate_task_breakdown(&pool, &completion, tenant_id, event_id, None)
        .await
        .expect("generation should succeed");

    assert_eq!(breakdown.task_count(), 4);
    assert_eq!(breakdown.guest_count, 80);
    // No similar events seeded, so the disclaimer applies.
    assert!(breakdown.disclaimer.is_some());

    let report =
        save_task_breakdown_for_event(&pool, tenant_id, event_id, location_id, &breakdown)
            .await
            .expect("save should succeed");
    assert_eq!(report.created.len(), 4);
    assert!(report.created.iter().all(|t| t.location_id == location_id));
    assert!(
        report
            .created
            .iter()
            .all(|t| t.status == PrepTaskStatus::Pending)
    );

    // Critical task got the elevated priority.
    let brine = report
        .created
        .iter()
        .find(|t| t.name == "Brine chicken")
        .expect("brine task saved");
    assert_eq!(brine.priority, 8);
    assert_eq!(brine.quantity_total, 80);

    // The saved rows survive the read path and its contract.
    let summaries = fetch_prep_task_summaries(&pool, tenant_id, event_id)
        .await
        .expect("summaries should validate");
    assert_eq!(summaries.len(), 4);
    assert!(summaries.iter().all(|s| s.status == "pending"));
    assert!(summaries.iter().all(|s| !s.is_event_finish));

    // Due dates resolved from relative-time phrases: the 24-hour task is due
    // a day before the 2-hour one.
    let stored = prep_tasks::list_prep_tasks_for_event(&pool, tenant_id, event_id)
        .await
        .expect("list");
    assert_eq!(stored[0].name, "Brine chicken");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn missing_event_is_an_error() {
    let (pool, db_name) = create_test_db().await;
    let completion = CannedCompletion(RESPONSE);

    let err = generate_task_breakdown(&pool, &completion, Uuid::new_v4(), Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn exported_csv_round_trips_through_a_file() {
    let (pool, db_name) = create_test_db().await;
    let tenant_id = Uuid::new_v4();
    let (event_id, _) = seed(&pool, tenant_id).await;

    let completion = CannedCompletion(RESPONSE);
    let breakdown = generate_task_breakdown(&pool, &completion, tenant_id, event_id, None)
        .await
        .expect("generation should succeed");

    let csv = breakdown_to_csv(&breakdown);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("breakdown.csv");
    std::fs::write(&path, &csv).expect("write csv");

    let read_back = std::fs::read_to_string(&path).expect("read csv");
    assert_eq!(read_back.lines().count(), 5);
    assert!(read_back.starts_with("\"Section\""));
    assert!(read_back.contains("\"Brine chicken\""));

    pool.close().await;
    drop_test_db(&db_name).await;
}
