//! AI-backed breakdown generation.
//!
//! Builds the prompt pair from event context, runs the completion service
//! once, scrapes a JSON object out of the response, and normalizes the
//! result into a [`TaskBreakdown`]. Any failure along that path -- transport
//! error, no JSON in the response, JSON that doesn't match the expected
//! shape -- degrades to the deterministic fallback roster. This function
//! never fails; confidence values tell the caller which path produced the
//! output.

use chrono::Utc;
use mise_db::models::{Event, EventDish, SimilarEvent, TaskSection};
use serde::Deserialize;

use super::extract::extract_json_object;
use super::fallback::generate_fallback;
use super::{AI_CONFIDENCE, MIN_TASK_MINUTES, TaskBreakdown, TaskBreakdownItem};
use crate::completion::CompletionService;

const SYSTEM_PROMPT: &str = r#"You are an experienced catering operations planner. Given an event's details, produce a complete task breakdown covering preparation, setup, and cleanup.

Guidelines:
1. Be specific: name concrete tasks tied to the actual menu and venue, not generic placeholders.
2. Give timing: every task gets a durationMinutes estimate and a relativeTime phrase such as "48 hours before event" or "2 hours before event".
3. Sequence realistically: ordering and advance prep come days out, perishable prep comes hours out, stations are set just before service.
4. Assign stations: where a task belongs to a kitchen station (grill, cold prep, pastry, dish pit), say so in the station field.
5. Flag criticality: mark tasks that would jeopardize the event if missed with isCritical true, and give dueInHours for hard deadlines.

Respond with ONLY a JSON object, no prose, matching:
{
  "prep":    [{"name", "description", "durationMinutes", "relativeTime", "station", "assignment", "ingredients", "steps", "isCritical", "dueInHours"}],
  "setup":   [ ...same shape... ],
  "cleanup": [ ...same shape... ]
}"#;

/// Assemble the user prompt from event context. Similar events are capped
/// at five by the query layer; dishes are included in full.
fn build_user_prompt(
    event: &Event,
    dishes: &[EventDish],
    similar_events: &[SimilarEvent],
    custom_instructions: Option<&str>,
) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("Event: ");
    prompt.push_str(&event.title);
    prompt.push_str("\nType: ");
    prompt.push_str(&event.event_type);
    prompt.push_str("\nDate: ");
    prompt.push_str(&event.event_date.to_rfc3339());
    prompt.push_str("\nGuests: ");
    prompt.push_str(&event.guest_count.to_string());
    if let Some(venue) = &event.venue_name {
        prompt.push_str("\nVenue: ");
        prompt.push_str(venue);
        if let Some(address) = &event.venue_address {
            prompt.push_str(" (");
            prompt.push_str(address);
            prompt.push(')');
        }
    }
    if let Some(notes) = &event.notes {
        prompt.push_str("\nNotes: ");
        prompt.push_str(notes);
    }

    if !dishes.is_empty() {
        prompt.push_str("\n\nMenu:");
        for dish in dishes {
            prompt.push_str("\n- ");
            prompt.push_str(&dish.name);
            prompt.push_str(" x");
            prompt.push_str(&dish.quantity_servings.to_string());
            if let Some(course) = &dish.course {
                prompt.push_str(" [");
                prompt.push_str(course);
                prompt.push(']');
            }
            if !dish.dietary_tags.is_empty() {
                prompt.push_str(" (");
                prompt.push_str(&dish.dietary_tags.join(", "));
                prompt.push(')');
            }
            if !dish.allergens.is_empty() {
                prompt.push_str(" allergens: ");
                prompt.push_str(&dish.allergens.join(", "));
            }
        }
    }

    if !similar_events.is_empty() {
        prompt.push_str("\n\nComparable past events:");
        for past in similar_events {
            prompt.push_str("\n- ");
            prompt.push_str(&past.title);
            prompt.push_str(" (");
            prompt.push_str(&past.guest_count.to_string());
            prompt.push_str(" guests, ");
            prompt.push_str(&past.event_date.format("%Y-%m-%d").to_string());
            prompt.push(')');
        }
    }

    if let Some(instructions) = custom_instructions {
        prompt.push_str("\n\nAdditional instructions: ");
        prompt.push_str(instructions);
    }

    prompt
}

/// Wire shape of one task as the model emits it. Everything is optional or
/// defaulted: the model frequently omits fields, and normalization fills the
/// gaps rather than rejecting the whole response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duration_minutes: Option<f64>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    relative_time: Option<String>,
    #[serde(default)]
    station: Option<String>,
    #[serde(default)]
    assignment: Option<String>,
    #[serde(default)]
    ingredients: Option<Vec<String>>,
    #[serde(default)]
    steps: Option<Vec<String>>,
    #[serde(default)]
    is_critical: bool,
    #[serde(default)]
    due_in_hours: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawBreakdown {
    #[serde(default)]
    prep: Vec<RawTask>,
    #[serde(default)]
    setup: Vec<RawTask>,
    #[serde(default)]
    cleanup: Vec<RawTask>,
}

/// Duration used when the model omits one. Chosen so a missing estimate is
/// visible (suspiciously uniform) without breaking downstream scheduling.
const DEFAULT_TASK_MINUTES: f64 = 30.0;

/// Turn raw model tasks into domain items: drop blank names, clamp
/// durations, stamp ids and the AI confidence value.
fn normalize_section(
    section: TaskSection,
    raw: Vec<RawTask>,
    stamp: i64,
) -> Vec<TaskBreakdownItem> {
    raw.into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .enumerate()
        .map(|(i, t)| {
            let minutes = t
                .duration_minutes
                .filter(|m| m.is_finite())
                .unwrap_or(DEFAULT_TASK_MINUTES)
                .round() as i32;
            TaskBreakdownItem {
                id: format!("{section}-{}-{stamp}", i + 1),
                name: t.name,
                description: t.description,
                section,
                duration_minutes: minutes.max(MIN_TASK_MINUTES),
                start_time: t.start_time,
                end_time: t.end_time,
                relative_time: t.relative_time,
                station: t.station,
                assignment: t.assignment,
                ingredients: t.ingredients,
                steps: t.steps,
                is_critical: t.is_critical,
                due_in_hours: t.due_in_hours,
                confidence: Some(AI_CONFIDENCE),
            }
        })
        .collect()
}

fn parse_response(text: &str, stamp: i64) -> Option<RawBreakdown> {
    let json = extract_json_object(text)?;
    match serde_json::from_str::<RawBreakdown>(json) {
        Ok(raw) => Some(raw),
        Err(err) => {
            tracing::warn!(error = %err, stamp, "completion JSON did not match breakdown shape");
            None
        }
    }
}

/// Generate a breakdown for `event` via `completion`, falling back to the
/// rule-based roster on any failure. Infallible by construction.
pub async fn generate_with_completion(
    completion: &dyn CompletionService,
    event: &Event,
    dishes: &[EventDish],
    similar_events: &[SimilarEvent],
    custom_instructions: Option<&str>,
) -> TaskBreakdown {
    let generated_at = Utc::now();
    let stamp = generated_at.timestamp_millis();

    let user_prompt = build_user_prompt(event, dishes, similar_events, custom_instructions);

    let raw = match completion.complete(SYSTEM_PROMPT, &user_prompt).await {
        Ok(text) => parse_response(&text, stamp),
        Err(err) => {
            tracing::warn!(
                backend = completion.name(),
                error = %err,
                "completion request failed"
            );
            None
        }
    };

    let (prep, setup, cleanup) = match raw {
        Some(raw) => (
            normalize_section(TaskSection::Prep, raw.prep, stamp),
            normalize_section(TaskSection::Setup, raw.setup, stamp),
            normalize_section(TaskSection::Cleanup, raw.cleanup, stamp),
        ),
        None => {
            tracing::info!(event_id = %event.id, "using rule-based fallback roster");
            generate_fallback(event.guest_count, event.venue_name.as_deref(), generated_at)
        }
    };

    TaskBreakdown::assemble(
        prep,
        setup,
        cleanup,
        event.guest_count,
        event.event_date,
        generated_at,
        similar_events.len(),
    )
}
