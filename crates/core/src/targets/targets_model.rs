//! Target domain models.
//!
//! A target is either a savings goal or a spending budget. Both share the
//! same amounts and period; the kind-specific data lives in [`TargetDetails`]
//! so that a budget can never carry a goal lifecycle status and vice versa.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::PERCENT_MAX;
use crate::tracking::TargetStatus;

/// Discriminator for the two kinds of target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Goal,
    Budget,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Goal => "goal",
            TargetKind::Budget => "budget",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted lifecycle status of a goal.
///
/// `Paused` and `Cancelled` are only ever set by explicit user commands.
/// `Completed` and `Failed` are normally derived on read; they are accepted
/// here so that a stored, already-settled goal round-trips unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Paused => "paused",
            GoalStatus::Completed => "completed",
            GoalStatus::Failed => "failed",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Savings,
    DebtPayoff,
    Investment,
    ExpenseReduction,
    #[default]
    General,
}

/// Goal priority. Ordered so that `Urgent` compares greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Recurrence unit used to spread a remaining amount over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl PeriodType {
    /// Nominal length of one period in days.
    pub fn length_days(&self) -> i64 {
        match self {
            PeriodType::Weekly => 7,
            PeriodType::Monthly => 30,
            PeriodType::Yearly => 365,
        }
    }
}

/// Kind-specific target data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDetails {
    Goal {
        #[serde(default)]
        status: GoalStatus,
        #[serde(default)]
        goal_type: GoalType,
        #[serde(default)]
        priority: GoalPriority,
    },
    Budget {
        #[serde(default)]
        period: PeriodType,
    },
}

impl TargetDetails {
    /// Details for a new active goal with default type and priority.
    pub fn goal() -> Self {
        TargetDetails::Goal {
            status: GoalStatus::Active,
            goal_type: GoalType::default(),
            priority: GoalPriority::default(),
        }
    }

    pub fn budget(period: PeriodType) -> Self {
        TargetDetails::Budget { period }
    }
}

/// A goal or budget being tracked.
///
/// For goals `current_amount` is the amount saved; for budgets it is the
/// amount spent. It only ever changes through contributions, never on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    /// Value already present before tracking started.
    #[serde(default)]
    pub baseline_amount: Decimal,
    pub start_date: NaiveDate,
    /// `None` for open-ended goals.
    pub end_date: Option<NaiveDate>,
    /// Weak reference; only used to route transaction events.
    pub linked_category_id: Option<String>,
    #[serde(default)]
    pub auto_track: bool,
    #[serde(flatten)]
    pub details: TargetDetails,
    /// Progress percentage seen by the previous evaluation.
    #[serde(default)]
    pub last_progress_percentage: Decimal,
    /// Derived status seen by the previous evaluation.
    #[serde(default)]
    pub last_status: Option<TargetStatus>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self.details {
            TargetDetails::Goal { .. } => TargetKind::Goal,
            TargetDetails::Budget { .. } => TargetKind::Budget,
        }
    }

    pub fn is_goal(&self) -> bool {
        self.kind() == TargetKind::Goal
    }

    /// Stored lifecycle status, `None` for budgets.
    pub fn goal_status(&self) -> Option<GoalStatus> {
        match self.details {
            TargetDetails::Goal { status, .. } => Some(status),
            TargetDetails::Budget { .. } => None,
        }
    }

    pub fn priority(&self) -> GoalPriority {
        match self.details {
            TargetDetails::Goal { priority, .. } => priority,
            TargetDetails::Budget { .. } => GoalPriority::default(),
        }
    }

    /// Auto-tracking needs both the flag and a live category link.
    pub fn is_auto_tracking_enabled(&self) -> bool {
        self.auto_track && self.linked_category_id.is_some()
    }

    /// Whether an event for `category_id` should be booked on this target.
    pub fn tracks_category(&self, category_id: &str) -> bool {
        self.is_auto_tracking_enabled() && self.linked_category_id.as_deref() == Some(category_id)
    }
}

/// Origin of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionSource {
    Manual,
    AutoTracked,
}

/// Identity of the transaction event last applied to an auto-tracked
/// contribution.
///
/// Ordered by time, then by the event's content, so two events stamped with
/// the same instant still resolve the same way whatever order they arrive in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceVersion {
    pub occurred_at: DateTime<Utc>,
    pub category_id: String,
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    pub signed_amount: Decimal,
}

/// A signed change to a target's current amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub target_id: String,
    pub amount: Decimal,
    pub contributed_at: DateTime<Utc>,
    pub source: ContributionSource,
    /// Present only for auto-tracked contributions.
    pub source_transaction_id: Option<String>,
    /// Last transaction event applied to this contribution.
    #[serde(default)]
    pub source_version: Option<SourceVersion>,
    /// Set when the source transaction was deleted; the entry is then a
    /// tombstone that no longer counts towards the current amount.
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Contribution {
    pub fn is_live(&self) -> bool {
        self.revoked_at.is_none()
    }

    pub fn is_auto_tracked(&self) -> bool {
        self.source == ContributionSource::AutoTracked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Achieved,
    Skipped,
}

/// A percentage threshold whose first crossing is recorded permanently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub target_id: String,
    pub name: String,
    /// Threshold in percent, 0 to 100.
    pub threshold_percentage: Decimal,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default)]
    pub achieved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reward_points: u32,
}

impl Milestone {
    pub fn is_achieved(&self) -> bool {
        self.status == MilestoneStatus::Achieved
    }

    pub fn is_pending(&self) -> bool {
        self.status == MilestoneStatus::Pending
    }

    /// Absolute amount at which this milestone is reached on `target`.
    pub fn amount_for(&self, target: &Target) -> Decimal {
        let threshold = self.threshold_percentage.clamp(Decimal::ZERO, PERCENT_MAX);
        let span = target.target_amount.saturating_sub(target.baseline_amount);
        target
            .baseline_amount
            .saturating_add(span.saturating_mul(threshold / PERCENT_MAX))
    }
}

/// Everything the engine needs to evaluate one target: the target record plus
/// its owned children, as loaded by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTarget {
    pub target: Target,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl TrackedTarget {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            contributions: Vec::new(),
            milestones: Vec::new(),
        }
    }

    pub fn with_milestones(mut self, milestones: Vec<Milestone>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn with_contributions(mut self, contributions: Vec<Contribution>) -> Self {
        self.contributions = contributions;
        self
    }

    /// Auto-tracked contribution (live or revoked) for a transaction, if any.
    pub fn auto_tracked_entry(&self, transaction_id: &str) -> Option<&Contribution> {
        self.contributions
            .iter()
            .find(|c| c.is_auto_tracked() && c.source_transaction_id.as_deref() == Some(transaction_id))
    }

    pub fn live_contributions(&self) -> impl Iterator<Item = &Contribution> {
        self.contributions.iter().filter(|c| c.is_live())
    }
}
