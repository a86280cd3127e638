//! Status classification.
//!
//! A pure mapping from a target, its time window and its progress to a
//! discrete status plus the derived `is_on_track` / `is_overdue` flags.
//! Nothing here is persisted; every read recomputes it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::progress_calculator::Progress;
use super::time_window::TimeWindow;
use super::tracking_config::TrackingConfig;
use crate::constants::PERCENT_MAX;
use crate::targets::{GoalStatus, Target, TargetDetails};

/// Health of a budget relative to its allocation and elapsed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    AheadOfSchedule,
    BehindSchedule,
    Warning,
    OverBudget,
    Critical,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "on_track",
            BudgetStatus::AheadOfSchedule => "ahead_of_schedule",
            BudgetStatus::BehindSchedule => "behind_schedule",
            BudgetStatus::Warning => "warning",
            BudgetStatus::OverBudget => "over_budget",
            BudgetStatus::Critical => "critical",
        }
    }

    /// True once spending has reached the allocation.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, BudgetStatus::OverBudget | BudgetStatus::Critical)
    }
}

/// Derived status of any target.
///
/// Serialized as a flat snake_case string; goal and budget names are
/// disjoint so the kind can be recovered when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetStatus {
    Goal(GoalStatus),
    Budget(BudgetStatus),
    /// The target's amounts or period are malformed.
    ConfigurationInvalid,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Goal(status) => status.as_str(),
            TargetStatus::Budget(status) => status.as_str(),
            TargetStatus::ConfigurationInvalid => "configuration_invalid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let status = match value {
            "active" => TargetStatus::Goal(GoalStatus::Active),
            "paused" => TargetStatus::Goal(GoalStatus::Paused),
            "completed" => TargetStatus::Goal(GoalStatus::Completed),
            "failed" => TargetStatus::Goal(GoalStatus::Failed),
            "cancelled" => TargetStatus::Goal(GoalStatus::Cancelled),
            "on_track" => TargetStatus::Budget(BudgetStatus::OnTrack),
            "ahead_of_schedule" => TargetStatus::Budget(BudgetStatus::AheadOfSchedule),
            "behind_schedule" => TargetStatus::Budget(BudgetStatus::BehindSchedule),
            "warning" => TargetStatus::Budget(BudgetStatus::Warning),
            "over_budget" => TargetStatus::Budget(BudgetStatus::OverBudget),
            "critical" => TargetStatus::Budget(BudgetStatus::Critical),
            "configuration_invalid" => TargetStatus::ConfigurationInvalid,
            _ => return None,
        };
        Some(status)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TargetStatus::Goal(GoalStatus::Completed))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TargetStatus::Goal(GoalStatus::Cancelled))
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for TargetStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TargetStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        TargetStatus::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown target status '{}'", value)))
    }
}

/// Output of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: TargetStatus,
    pub is_on_track: bool,
    pub is_overdue: bool,
}

impl Classification {
    fn invalid() -> Self {
        Self {
            status: TargetStatus::ConfigurationInvalid,
            is_on_track: false,
            is_overdue: false,
        }
    }
}

/// Whether the target's amounts and period are usable at all.
pub fn is_configuration_valid(target: &Target) -> bool {
    if target.target_amount <= Decimal::ZERO {
        return false;
    }
    match target.end_date {
        Some(end) => end >= target.start_date,
        None => true,
    }
}

/// Spent share of a budget's allocation, in percent and not clamped.
pub fn budget_usage_percentage(spent: Decimal, allocated: Decimal) -> Decimal {
    if allocated <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_mul(PERCENT_MAX)
        .and_then(|scaled| scaled.checked_div(allocated))
        .unwrap_or(if spent.is_sign_positive() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// Classifies a target. Never fails: malformed targets come back as
/// [`TargetStatus::ConfigurationInvalid`].
pub fn classify(
    target: &Target,
    window: &TimeWindow,
    progress: &Progress,
    config: &TrackingConfig,
) -> Classification {
    if !is_configuration_valid(target) {
        return Classification::invalid();
    }

    match target.details {
        TargetDetails::Goal { status, .. } => classify_goal(status, window, progress, config),
        TargetDetails::Budget { .. } => {
            let usage = budget_usage_percentage(target.current_amount, target.target_amount);
            let status = classify_budget(usage, window, config);
            Classification {
                status: TargetStatus::Budget(status),
                is_on_track: matches!(
                    status,
                    BudgetStatus::OnTrack | BudgetStatus::AheadOfSchedule
                ),
                // A budget period running out is not a missed deadline.
                is_overdue: false,
            }
        }
    }
}

/// Derives a goal's status from its stored lifecycle status.
///
/// Paused and cancelled goals keep their status. Any other stored status is
/// re-derived: completed at 100%, failed once the end date has passed short of
/// 100%, active otherwise.
pub fn derive_goal_status(stored: GoalStatus, window: &TimeWindow, progress: &Progress) -> GoalStatus {
    match stored {
        GoalStatus::Paused | GoalStatus::Cancelled => stored,
        GoalStatus::Active | GoalStatus::Completed | GoalStatus::Failed => {
            if progress.progress_percentage >= PERCENT_MAX {
                GoalStatus::Completed
            } else if window.has_ended() {
                GoalStatus::Failed
            } else {
                GoalStatus::Active
            }
        }
    }
}

fn classify_goal(
    stored: GoalStatus,
    window: &TimeWindow,
    progress: &Progress,
    config: &TrackingConfig,
) -> Classification {
    let status = derive_goal_status(stored, window, progress);

    let is_on_track = match status {
        GoalStatus::Completed => true,
        GoalStatus::Failed | GoalStatus::Cancelled => false,
        GoalStatus::Active | GoalStatus::Paused => match window.elapsed_percentage() {
            Some(expected) => progress.progress_percentage >= expected - config.on_track_tolerance,
            // No schedule to fall behind.
            None => true,
        },
    };

    let is_overdue =
        window.has_ended() && !matches!(status, GoalStatus::Completed | GoalStatus::Cancelled);

    Classification {
        status: TargetStatus::Goal(status),
        is_on_track,
        is_overdue,
    }
}

/// Buckets a budget by usage and elapsed share of its period.
///
/// Below the warning threshold the budget is `ahead_of_schedule` while less
/// has been spent than time has passed, `on_track` otherwise. In the warning
/// band it is `warning` when spending outpaces time and `behind_schedule`
/// when it does not. At the limit it is `over_budget`, or `critical` once
/// the period has ended. Open-ended budgets skip the time comparison.
pub fn classify_budget(usage: Decimal, window: &TimeWindow, config: &TrackingConfig) -> BudgetStatus {
    let elapsed = window.elapsed_percentage();

    if usage >= config.budget_limit_threshold {
        if window.has_ended() {
            BudgetStatus::Critical
        } else {
            BudgetStatus::OverBudget
        }
    } else if usage >= config.budget_warning_threshold {
        match elapsed {
            Some(elapsed) if elapsed >= usage => BudgetStatus::BehindSchedule,
            _ => BudgetStatus::Warning,
        }
    } else {
        match elapsed {
            Some(elapsed) if elapsed > usage => BudgetStatus::AheadOfSchedule,
            _ => BudgetStatus::OnTrack,
        }
    }
}
