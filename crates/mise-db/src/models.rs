use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Section of an event plan a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskSection {
    Prep,
    Setup,
    Cleanup,
}

impl TaskSection {
    /// All sections in plan order (prep, setup, cleanup).
    pub const ALL: [TaskSection; 3] = [Self::Prep, Self::Setup, Self::Cleanup];
}

impl fmt::Display for TaskSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Prep => "prep",
            Self::Setup => "setup",
            Self::Cleanup => "cleanup",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskSection {
    type Err = TaskSectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prep" => Ok(Self::Prep),
            "setup" => Ok(Self::Setup),
            "cleanup" => Ok(Self::Cleanup),
            other => Err(TaskSectionParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TaskSection`] string.
#[derive(Debug, Clone)]
pub struct TaskSectionParseError(pub String);

impl fmt::Display for TaskSectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task section: {:?}", self.0)
    }
}

impl std::error::Error for TaskSectionParseError {}

// ---------------------------------------------------------------------------

/// Lifecycle status of a persisted prep task.
///
/// Tasks are always created as `pending`; the kitchen board moves them
/// through the remaining states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PrepTaskStatus {
    Pending,
    InProgress,
    Completed,
    Canceled,
}

impl fmt::Display for PrepTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

impl FromStr for PrepTaskStatus {
    type Err = PrepTaskStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(PrepTaskStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PrepTaskStatus`] string.
#[derive(Debug, Clone)]
pub struct PrepTaskStatusParseError(pub String);

impl fmt::Display for PrepTaskStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid prep task status: {:?}", self.0)
    }
}

impl std::error::Error for PrepTaskStatusParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// An event -- the unit everything else hangs off.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub event_type: String,
    pub event_date: DateTime<Utc>,
    pub guest_count: i32,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A tenant location (kitchen, warehouse, venue base).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A dish linked to an event's menu, denormalized for prompt context.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventDish {
    pub link_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub course: Option<String>,
    pub quantity_servings: i32,
    pub dietary_tags: Vec<String>,
    pub allergens: Vec<String>,
}

/// Minimal projection of a past event used as generation context.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SimilarEvent {
    pub id: Uuid,
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub guest_count: i32,
}

/// A persisted, schedulable prep task record.
///
/// `id` is the opaque string minted by the breakdown generator, carried
/// through unchanged from the in-memory item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrepTask {
    pub id: String,
    pub tenant_id: Uuid,
    pub event_id: Uuid,
    pub location_id: Uuid,
    pub task_type: TaskSection,
    pub name: String,
    pub quantity_total: i32,
    pub servings_total: Option<i32>,
    pub start_by_date: DateTime<Utc>,
    pub due_by_date: DateTime<Utc>,
    pub estimated_minutes: i32,
    pub status: PrepTaskStatus,
    pub priority: i32,
    pub is_event_finish: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a prep task. Server fills `created_at`.
#[derive(Debug, Clone)]
pub struct NewPrepTask {
    pub id: String,
    pub tenant_id: Uuid,
    pub event_id: Uuid,
    pub location_id: Uuid,
    pub task_type: TaskSection,
    pub name: String,
    pub quantity_total: i32,
    pub servings_total: Option<i32>,
    pub start_by_date: DateTime<Utc>,
    pub due_by_date: DateTime<Utc>,
    pub estimated_minutes: i32,
    pub status: PrepTaskStatus,
    pub priority: i32,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
