//! Alert models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::targets::GoalPriority;

// =============================================================================
// Severity
// =============================================================================

/// Alert severity.
///
/// Ordered from lowest to highest: Success < Info < Warning < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Success,
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Success => "success",
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Message keys
// =============================================================================

pub const GOAL_COMPLETED: &str = "goal.completed";
pub const GOAL_OVERDUE: &str = "goal.overdue";
pub const GOAL_BEHIND_SCHEDULE: &str = "goal.behind_schedule";
pub const BUDGET_OVER_BUDGET: &str = "budget.over_budget";
pub const BUDGET_PROJECTED_OVERSPEND: &str = "budget.projected_overspend";
pub const BUDGET_NEAR_LIMIT: &str = "budget.near_limit";
pub const BUDGET_USAGE_NOTICE: &str = "budget.usage_notice";
pub const TARGET_CONFIGURATION_INVALID: &str = "target.configuration_invalid";

// =============================================================================
// Suggested Action
// =============================================================================

/// A follow-up the user can take on an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// Stable action identifier (e.g. "increase_contribution").
    pub action: String,
    /// Amount the action refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl SuggestedAction {
    fn new(action: &str, amount: Option<Decimal>) -> Self {
        Self {
            action: action.to_string(),
            amount,
        }
    }

    /// Raise the periodic contribution to the recommended amount.
    pub fn increase_contribution(recommended: Option<Decimal>) -> Self {
        Self::new("increase_contribution", recommended)
    }

    pub fn extend_end_date() -> Self {
        Self::new("extend_end_date", None)
    }

    /// Cut spending to at most `daily_allowance` per day.
    pub fn reduce_spending(daily_allowance: Option<Decimal>) -> Self {
        Self::new("reduce_spending", daily_allowance)
    }

    pub fn raise_budget_limit(overspend: Decimal) -> Self {
        Self::new("raise_budget_limit", Some(overspend))
    }

    pub fn review_target_settings() -> Self {
        Self::new("review_target_settings", None)
    }
}

// =============================================================================
// Alert
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    /// Localisation key; rendering is left to the presentation layer.
    pub message_key: String,
    pub target_id: String,
    /// Priority of the owning target, used as a sort tiebreak.
    pub priority: GoalPriority,
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedAction>,
}

impl Alert {
    pub fn new(
        severity: AlertSeverity,
        message_key: &str,
        target_id: &str,
        priority: GoalPriority,
    ) -> Self {
        Self {
            severity,
            message_key: message_key.to_string(),
            target_id: target_id.to_string(),
            priority,
            suggested_actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: SuggestedAction) -> Self {
        self.suggested_actions.push(action);
        self
    }
}

/// Sorts alerts most urgent first: severity, then priority, then target id
/// and message key so the order is fully deterministic.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| a.target_id.cmp(&b.target_id))
            .then_with(|| a.message_key.cmp(&b.message_key))
    });
}
