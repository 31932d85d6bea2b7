//! Task breakdown generation.
//!
//! [`generate`] holds the AI-backed path (prompt construction, response
//! parsing, post-processing); [`fallback`] is the deterministic roster used
//! when that path fails; [`extract`] is the JSON-scraping utility between
//! them; [`service`] wires the database context in.

pub mod extract;
pub mod fallback;
pub mod generate;
pub mod service;
mod types;

pub use types::{TaskBreakdown, TaskBreakdownItem};

/// Confidence stamped on tasks that came out of the completion service.
pub const AI_CONFIDENCE: f64 = 0.85;

/// Confidence stamped on tasks from the rule-based fallback roster.
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

/// Floor applied to every generated task duration, in minutes.
pub const MIN_TASK_MINUTES: i32 = 5;
