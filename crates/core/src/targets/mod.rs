//! Targets module - goal and budget domain models.

mod targets_model;

pub use targets_model::*;

#[cfg(test)]
mod targets_model_tests;
