//! CSV export of a task breakdown.
//!
//! Flat, spreadsheet-friendly output: one row per task in section order,
//! every field quoted. The format is intentionally dumb -- no per-type
//! quoting decisions, no locale handling -- so it opens identically in
//! every spreadsheet tool the back office uses.

use mise_db::models::TaskSection;

use crate::breakdown::{TaskBreakdown, TaskBreakdownItem};

const HEADER: &[&str] = &[
    "Section",
    "Task",
    "Description",
    "Duration (min)",
    "Start",
    "End",
    "Relative Time",
    "Assignment",
    "Ingredients",
    "Steps",
    "Critical",
    "Due (hours)",
    "Confidence",
];

/// Quote one cell: wrap in double quotes, doubling any quotes inside.
fn escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn section_label(section: TaskSection) -> &'static str {
    match section {
        TaskSection::Prep => "Prep",
        TaskSection::Setup => "Setup",
        TaskSection::Cleanup => "Cleanup",
    }
}

fn list_cell(values: Option<&Vec<String>>) -> String {
    values.map(|v| v.join("; ")).unwrap_or_default()
}

fn task_row(task: &TaskBreakdownItem) -> String {
    let cells = [
        section_label(task.section).to_string(),
        task.name.clone(),
        task.description.clone().unwrap_or_default(),
        task.duration_minutes.to_string(),
        task.start_time.clone().unwrap_or_default(),
        task.end_time.clone().unwrap_or_default(),
        task.relative_time.clone().unwrap_or_default(),
        task.assignment.clone().unwrap_or_default(),
        list_cell(task.ingredients.as_ref()),
        list_cell(task.steps.as_ref()),
        if task.is_critical { "yes" } else { "no" }.to_string(),
        task.due_in_hours.map(|h| h.to_string()).unwrap_or_default(),
        task.confidence.map(|c| c.to_string()).unwrap_or_default(),
    ];
    cells
        .iter()
        .map(|c| escape(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the breakdown as CSV text: a header row, then one row per task
/// in section order (prep, setup, cleanup).
pub fn breakdown_to_csv(breakdown: &TaskBreakdown) -> String {
    let mut rows = Vec::with_capacity(breakdown.task_count() + 1);
    rows.push(
        HEADER
            .iter()
            .map(|h| escape(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    rows.extend(breakdown.all_tasks().map(task_row));
    rows.join("\n")
}
