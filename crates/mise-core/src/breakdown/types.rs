//! The in-memory breakdown data model.

use chrono::{DateTime, Utc};
use mise_db::models::TaskSection;
use serde::{Deserialize, Serialize};

/// One actionable unit of work inside a breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBreakdownItem {
    /// Opaque id, stable within one breakdown: `{section}-{index}-{millis}`.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub section: TaskSection,
    /// Always >= 5; generator output is clamped up to this floor, never down.
    pub duration_minutes: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Free-text timing hint, e.g. "48 hours before event". Interpreted by
    /// the scheduler at save time, not here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    pub is_critical: bool,
    /// Set only when the task is critical and a deadline distinct from
    /// `relative_time` is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_in_hours: Option<i32>,
    /// 0.85 for AI output, 0.7 for fallback -- the only provenance signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The aggregate result of one generation run. A point-in-time snapshot:
/// `guest_count` and `event_date` are copied from the event, not live-linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBreakdown {
    pub prep: Vec<TaskBreakdownItem>,
    pub setup: Vec<TaskBreakdownItem>,
    pub cleanup: Vec<TaskBreakdownItem>,
    pub total_prep_time: i32,
    pub total_setup_time: i32,
    pub total_cleanup_time: i32,
    pub guest_count: i32,
    pub event_date: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_event_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}

fn section_total(tasks: &[TaskBreakdownItem]) -> i32 {
    tasks.iter().map(|t| t.duration_minutes).sum()
}

impl TaskBreakdown {
    /// Assemble a breakdown from per-section task lists, computing the
    /// section totals. This is the only constructor, which is what keeps the
    /// totals-equal-sums invariant structural.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        prep: Vec<TaskBreakdownItem>,
        setup: Vec<TaskBreakdownItem>,
        cleanup: Vec<TaskBreakdownItem>,
        guest_count: i32,
        event_date: DateTime<Utc>,
        generated_at: DateTime<Utc>,
        historical_event_count: usize,
    ) -> Self {
        Self {
            total_prep_time: section_total(&prep),
            total_setup_time: section_total(&setup),
            total_cleanup_time: section_total(&cleanup),
            prep,
            setup,
            cleanup,
            guest_count,
            event_date,
            generated_at,
            historical_event_count: (historical_event_count > 0)
                .then_some(historical_event_count),
            disclaimer: (historical_event_count == 0).then(|| {
                "Generated from event details (no historical data available)".to_string()
            }),
        }
    }

    /// All tasks in section order (prep, setup, cleanup).
    pub fn all_tasks(&self) -> impl Iterator<Item = &TaskBreakdownItem> {
        self.prep
            .iter()
            .chain(self.setup.iter())
            .chain(self.cleanup.iter())
    }

    /// Total number of tasks across all sections.
    pub fn task_count(&self) -> usize {
        self.prep.len() + self.setup.len() + self.cleanup.len()
    }
}
