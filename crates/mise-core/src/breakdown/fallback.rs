//! Deterministic rule-based task roster.
//!
//! Used when the completion service is unavailable or its output is
//! unusable. Pure function of guest count and venue presence: no I/O, never
//! fails. Durations scale with `guest_count / 25`, each with its own
//! multiplier ceiling so small crews aren't asked to chop vegetables for
//! eight hours.

use chrono::{DateTime, Utc};
use mise_db::models::TaskSection;

use super::{FALLBACK_CONFIDENCE, MIN_TASK_MINUTES, TaskBreakdownItem};

/// Per-task duration scaling: `base` minutes times the scale factor, the
/// factor clamped to `cap` when one is set, rounded to nearest, floored at
/// [`MIN_TASK_MINUTES`].
fn scaled_minutes(base: f64, scale_factor: f64, cap: Option<f64>) -> i32 {
    let factor = cap.map_or(scale_factor, |c| scale_factor.min(c));
    let minutes = (base * factor).round() as i32;
    minutes.max(MIN_TASK_MINUTES)
}

struct RosterEntry {
    name: String,
    description: String,
    base_minutes: f64,
    cap: Option<f64>,
    relative_time: &'static str,
    is_critical: bool,
    due_in_hours: Option<i32>,
    steps: Option<Vec<String>>,
}

fn build(
    section: TaskSection,
    index: usize,
    stamp: i64,
    scale_factor: f64,
    entry: RosterEntry,
) -> TaskBreakdownItem {
    TaskBreakdownItem {
        id: format!("{section}-{index}-{stamp}"),
        name: entry.name,
        description: Some(entry.description),
        section,
        duration_minutes: scaled_minutes(entry.base_minutes, scale_factor, entry.cap),
        start_time: None,
        end_time: None,
        relative_time: Some(entry.relative_time.to_string()),
        station: None,
        assignment: None,
        ingredients: None,
        steps: entry.steps,
        is_critical: entry.is_critical,
        due_in_hours: entry.due_in_hours,
        confidence: Some(FALLBACK_CONFIDENCE),
    }
}

/// Synthesize the fixed fallback roster: 4 prep, 3 setup, 3 cleanup tasks.
///
/// `generated_at` seeds the id stamp so ids are stable within one breakdown.
pub fn generate_fallback(
    guest_count: i32,
    venue_name: Option<&str>,
    generated_at: DateTime<Utc>,
) -> (
    Vec<TaskBreakdownItem>,
    Vec<TaskBreakdownItem>,
    Vec<TaskBreakdownItem>,
) {
    let scale_factor = f64::from(guest_count) / 25.0;
    let stamp = generated_at.timestamp_millis();
    let has_venue = venue_name.is_some();

    let prep_entries = vec![
        RosterEntry {
            name: "Review event details and menu".to_string(),
            description: "Finalize menu items, guest count, and special requirements".to_string(),
            base_minutes: 30.0,
            cap: Some(2.0),
            relative_time: "48 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        },
        RosterEntry {
            name: "Order special ingredients".to_string(),
            description: "Place orders for items requiring advance procurement".to_string(),
            base_minutes: 20.0,
            cap: Some(2.0),
            relative_time: "72 hours before event",
            is_critical: true,
            due_in_hours: Some(72),
            steps: None,
        },
        RosterEntry {
            name: "Prep sauces and marinades".to_string(),
            description: "Prepare bases, sauces, and marinades that benefit from resting"
                .to_string(),
            base_minutes: 60.0,
            cap: Some(1.5),
            relative_time: "12 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        },
        RosterEntry {
            name: "Chop vegetables and mise en place".to_string(),
            description: "Complete all vegetable prep and station setup".to_string(),
            base_minutes: 90.0,
            cap: Some(1.5),
            relative_time: "6 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: Some(vec![
                "Wash and sanitize all produce".to_string(),
                "Chop vegetables according to recipe specifications".to_string(),
                "Portion and label all prep items".to_string(),
                "Set up work stations".to_string(),
            ]),
        },
    ];

    let transport_out = if has_venue {
        RosterEntry {
            name: "Transport equipment to venue".to_string(),
            description: "Load and transport all cooking equipment and supplies".to_string(),
            base_minutes: 60.0,
            cap: Some(1.5),
            relative_time: "4 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        }
    } else {
        RosterEntry {
            name: "Stage equipment on site".to_string(),
            description: "Gather and stage all cooking equipment and supplies in the kitchen"
                .to_string(),
            base_minutes: 60.0,
            cap: Some(1.5),
            relative_time: "4 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        }
    };

    let setup_entries = vec![
        transport_out,
        RosterEntry {
            name: "Set up cooking and serving stations".to_string(),
            description: "Configure cooking equipment, chafing dishes, and display areas"
                .to_string(),
            base_minutes: 60.0,
            cap: Some(2.0),
            relative_time: "2 hours before event",
            is_critical: true,
            due_in_hours: None,
            steps: None,
        },
        RosterEntry {
            name: "Team briefing".to_string(),
            description: "Review timeline, assignments, and special requirements".to_string(),
            base_minutes: 15.0,
            cap: Some(1.5),
            relative_time: "1 hours before event",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        },
    ];

    let transport_back = if has_venue {
        RosterEntry {
            name: "Transport equipment back".to_string(),
            description: "Load and transport all equipment to home base".to_string(),
            base_minutes: 45.0,
            cap: Some(1.5),
            relative_time: "After service",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        }
    } else {
        RosterEntry {
            name: "Reset kitchen and storage".to_string(),
            description: "Return equipment to storage and reset the kitchen".to_string(),
            base_minutes: 45.0,
            cap: Some(1.5),
            relative_time: "After service",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        }
    };

    let cleanup_entries = vec![
        RosterEntry {
            name: "Break down serving stations and pack leftovers".to_string(),
            description: "Remove empty containers and store leftover food for the client"
                .to_string(),
            base_minutes: 30.0,
            cap: Some(1.5),
            relative_time: "During service",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        },
        RosterEntry {
            name: "Clean cooking equipment".to_string(),
            description: "Wash, sanitize, and store all cooking equipment".to_string(),
            base_minutes: 60.0,
            cap: None,
            relative_time: "After service",
            is_critical: false,
            due_in_hours: None,
            steps: None,
        },
        transport_back,
    ];

    let materialize = |section: TaskSection, entries: Vec<RosterEntry>| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| build(section, i + 1, stamp, scale_factor, entry))
            .collect::<Vec<_>>()
    };

    (
        materialize(TaskSection::Prep, prep_entries),
        materialize(TaskSection::Setup, setup_entries),
        materialize(TaskSection::Cleanup, cleanup_entries),
    )
}
