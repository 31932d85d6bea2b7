//! Relative-time scheduling: free-text timing hints to concrete dates.
//!
//! This is deliberately not a date-time parser. It is a small ordered
//! decision table over substring matches, evaluated top-to-bottom with
//! first-match-wins semantics. The ordering is load-bearing: a hint
//! containing both "hours before" and "72" resolves through the first
//! branch. Saved schedules depend on it, so do not reorder the branches.

use chrono::{DateTime, Duration, Utc};

/// Concrete calendar window for one task, anchored to the event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSchedule {
    pub start_by: DateTime<Utc>,
    pub due_by: DateTime<Utc>,
}

impl TaskSchedule {
    fn at(event_date: DateTime<Utc>) -> Self {
        Self {
            start_by: event_date,
            due_by: event_date,
        }
    }
}

/// Map a task's free-text relative-time hint onto start/due dates.
///
/// Rules, first match wins:
/// 1. Hint contains `"hours before"`: due = event minus the first run of
///    digits found anywhere in the hint (0 when none), start unchanged.
///    Hour counts too large to represent as an offset leave the due date
///    at the event date.
/// 2. Hint contains `"before event"`: test `"72"`, `"48"`, `"24"`, `"12"`,
///    `"6"` in that order and apply the first that matches.
/// 3. Anything else (including no hint): both dates equal the event date.
pub fn resolve_schedule(relative_time: Option<&str>, event_date: DateTime<Utc>) -> TaskSchedule {
    let mut schedule = TaskSchedule::at(event_date);

    let Some(hint) = relative_time else {
        return schedule;
    };

    if hint.contains("hours before") {
        // Hints come from an untrusted completion backend; an absurd hour
        // count must not abort the save. Checked math throughout, leaving
        // the due date at the event date when the offset is unrepresentable.
        let hours = first_digit_run(hint).unwrap_or(0);
        if let Some(due) = Duration::try_hours(hours)
            .and_then(|offset| event_date.checked_sub_signed(offset))
        {
            schedule.due_by = due;
        }
    } else if hint.contains("before event") {
        if hint.contains("72") {
            schedule.start_by = event_date - Duration::days(3);
            schedule.due_by = event_date - Duration::days(2);
        } else if hint.contains("48") {
            schedule.start_by = event_date - Duration::days(2);
            schedule.due_by = event_date - Duration::days(2);
        } else if hint.contains("24") {
            schedule.start_by = event_date - Duration::days(1);
            schedule.due_by = event_date - Duration::days(1);
        } else if hint.contains("12") {
            schedule.due_by = event_date - Duration::hours(12);
        } else if hint.contains("6") {
            schedule.due_by = event_date - Duration::hours(6);
        }
    }

    schedule
}

/// Extract the first contiguous run of ASCII digits anywhere in the string.
fn first_digit_run(s: &str) -> Option<i64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
