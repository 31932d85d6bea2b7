//! Query functions, one module per table family.

pub mod events;
pub mod locations;
pub mod prep_tasks;
