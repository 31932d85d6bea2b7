//! Core engine for catering event operations: task breakdown generation,
//! relative-time scheduling, persistence, contract validation, and export.
//!
//! The modules form a shallow dependency tree:
//! - [`contract`], [`schedule`], and [`export`] are leaves (pure logic).
//! - [`breakdown`] builds on the completion-service seam in [`completion`]
//!   and falls back to its own deterministic generator.
//! - [`persist`] converts a breakdown into durable records via [`schedule`]
//!   and a store trait.

pub mod breakdown;
pub mod completion;
pub mod contract;
pub mod export;
pub mod persist;
pub mod schedule;
