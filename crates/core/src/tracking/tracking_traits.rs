use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::alerts_model::Alert;
use super::auto_tracking::{LinkReport, TransactionEvent};
use super::tracking_model::{GoalCommand, TargetView, TargetsSummary};
use crate::activities::Activity;
use crate::errors::Result;
use crate::targets::TrackedTarget;

/// Trait for target tracking operations.
///
/// Targets are passed in as loaded snapshots and mutated in place; persisting
/// them is the caller's job. Every operation takes "now" explicitly.
pub trait TrackingServiceTrait: Send + Sync {
    fn evaluate(&self, tracked: &TrackedTarget, now: DateTime<Utc>) -> TargetView;

    fn evaluate_all(&self, targets: &[TrackedTarget], now: DateTime<Utc>) -> Vec<TargetView>;

    fn refresh(&self, tracked: &mut TrackedTarget, now: DateTime<Utc>) -> Vec<Activity>;

    fn add_contribution(
        &self,
        tracked: &mut TrackedTarget,
        amount: Decimal,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<Vec<Activity>>;

    fn apply_transaction_event(
        &self,
        targets: &mut [TrackedTarget],
        event: &TransactionEvent,
        now: DateTime<Utc>,
    ) -> Result<LinkReport>;

    fn apply_goal_command(
        &self,
        tracked: &mut TrackedTarget,
        command: GoalCommand,
        now: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;

    fn skip_milestone(
        &self,
        tracked: &mut TrackedTarget,
        milestone_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;

    fn detach_category(&self, targets: &mut [TrackedTarget], category_id: &str) -> Vec<String>;

    fn generate_alerts(&self, targets: &[TrackedTarget], now: DateTime<Utc>) -> Vec<Alert>;

    fn summarize(&self, views: &[TargetView]) -> TargetsSummary;
}
