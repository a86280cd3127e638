use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::alerts_model::Alert;
use super::status_classifier::TargetStatus;
use crate::targets::{GoalStatus, TargetKind};

/// Read-side view of one evaluated target.
///
/// Everything here is recomputed on every evaluation; none of it is written
/// back to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    pub target_id: String,
    pub kind: TargetKind,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub progress_percentage: Decimal,
    pub remaining_amount: Decimal,
    pub recommended_periodic_amount: Option<Decimal>,
    /// Spent share of the allocation, budgets only. Not clamped.
    pub usage_percentage: Option<Decimal>,
    pub status: TargetStatus,
    pub is_on_track: bool,
    pub is_overdue: bool,
    pub total_days: Option<i64>,
    pub elapsed_days: i64,
    pub remaining_days: Option<i64>,
    pub projected_total: Option<Decimal>,
    pub daily_average: Option<Decimal>,
    pub reaches_target_on: Option<NaiveDate>,
    pub will_exceed: bool,
    pub alerts: Vec<Alert>,
}

impl TargetView {
    pub fn is_goal(&self) -> bool {
        self.kind == TargetKind::Goal
    }
}

/// Explicit lifecycle command on a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCommand {
    Pause,
    Resume,
    Cancel,
}

impl GoalCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCommand::Pause => "pause",
            GoalCommand::Resume => "resume",
            GoalCommand::Cancel => "cancel",
        }
    }

    /// Stored status the command moves a goal to.
    pub fn target_status(&self) -> GoalStatus {
        match self {
            GoalCommand::Pause => GoalStatus::Paused,
            GoalCommand::Resume => GoalStatus::Active,
            GoalCommand::Cancel => GoalStatus::Cancelled,
        }
    }
}

/// Aggregate figures across a set of goal views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetsSummary {
    pub total_count: usize,
    pub active_count: usize,
    pub completed_count: usize,
    pub total_target_amount: Decimal,
    pub total_current_amount: Decimal,
}

impl TargetsSummary {
    /// Summarizes the goal views in `views`; budget views are ignored.
    pub fn from_views(views: &[TargetView]) -> Self {
        views
            .iter()
            .filter(|view| view.is_goal())
            .fold(Self::default(), |mut summary, view| {
                summary.total_count += 1;
                match view.status {
                    TargetStatus::Goal(GoalStatus::Active) => summary.active_count += 1,
                    TargetStatus::Goal(GoalStatus::Completed) => summary.completed_count += 1,
                    _ => {}
                }
                summary.total_target_amount = summary.total_target_amount.saturating_add(view.target_amount);
                summary.total_current_amount = summary.total_current_amount.saturating_add(view.current_amount);
                summary
            })
    }
}
