//! Tracking module - progress, status, projections, alerts and the
//! auto-tracking linker for goals and budgets.
//!
//! The calculators are pure functions of their inputs and an explicit as-of
//! date. `TrackingService` composes them and is the only place that mutates
//! targets or emits activities.

pub mod alert_generator;
pub mod alerts_model;
pub mod auto_tracking;
pub mod milestone_evaluator;
pub mod progress_calculator;
pub mod projection;
pub mod status_classifier;
pub mod time_window;

mod tracking_config;
mod tracking_model;
mod tracking_service;
mod tracking_traits;


pub use alert_generator::{alerts_for, AlertContext};
pub use alerts_model::{sort_alerts, Alert, AlertSeverity, SuggestedAction};
pub use auto_tracking::{
    booked_amount, LinkEffect, LinkOperation, LinkOutcome, LinkReport, TransactionEvent,
};
pub use milestone_evaluator::evaluate_milestones;
pub use progress_calculator::{calculate_progress, progress_percentage, Progress};
pub use projection::{project, DatedAmount, Projection};
pub use status_classifier::{
    classify, is_configuration_valid, BudgetStatus, Classification, TargetStatus,
};
pub use time_window::{resolve_time_window, TimeWindow};
pub use tracking_config::TrackingConfig;
pub use tracking_model::{GoalCommand, TargetView, TargetsSummary};
pub use tracking_service::TrackingService;
pub use tracking_traits::TrackingServiceTrait;
