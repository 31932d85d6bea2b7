//! Postgres persistence layer for the mise engine.
//!
//! Holds the connection/config plumbing, row models, and query functions.
//! Business logic lives in `mise-core`; this crate stays thin.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
