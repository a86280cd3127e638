//! Fintrack Core - goal and budget tracking engine.
//!
//! Computes progress, status, projections and alerts for savings goals and
//! spending budgets, and books categorized transactions onto them. The crate
//! is I/O-free: targets come in as snapshots, activities go out through an
//! [`activities::ActivitySink`], and persistence is left to the caller.

pub mod activities;
pub mod constants;
pub mod errors;
pub mod targets;
pub mod tracking;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
