//! Activity (timeline) models.
//!
//! Activities are append-only facts about a target. The engine creates them
//! as output; storing and rendering them is up to the host application.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tracking::{LinkOperation, TargetStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ContributionAdded,
    MilestoneAchieved,
    StatusChanged,
    AutoTrackedUpdate,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::ContributionAdded => "contribution_added",
            ActivityKind::MilestoneAchieved => "milestone_achieved",
            ActivityKind::StatusChanged => "status_changed",
            ActivityKind::AutoTrackedUpdate => "auto_tracked_update",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes the change an activity records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityPayload {
    ContributionAdded {
        contribution_id: String,
        amount: Decimal,
        current_amount: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    MilestoneAchieved {
        milestone_id: String,
        milestone_name: String,
        threshold_percentage: Decimal,
        current_amount: Decimal,
        reward_points: u32,
    },
    StatusChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<TargetStatus>,
        to: TargetStatus,
    },
    AutoTrackedUpdate {
        transaction_id: String,
        operation: LinkOperation,
        /// Net change applied to the current amount.
        delta: Decimal,
        current_amount: Decimal,
    },
}

impl ActivityPayload {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityPayload::ContributionAdded { .. } => ActivityKind::ContributionAdded,
            ActivityPayload::MilestoneAchieved { .. } => ActivityKind::MilestoneAchieved,
            ActivityPayload::StatusChanged { .. } => ActivityKind::StatusChanged,
            ActivityPayload::AutoTrackedUpdate { .. } => ActivityKind::AutoTrackedUpdate,
        }
    }
}

/// A timeline entry belonging to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub target_id: String,
    pub kind: ActivityKind,
    pub occurred_at: DateTime<Utc>,
    pub payload: ActivityPayload,
}

impl Activity {
    pub fn new(target_id: impl Into<String>, occurred_at: DateTime<Utc>, payload: ActivityPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target_id: target_id.into(),
            kind: payload.kind(),
            occurred_at,
            payload,
        }
    }
}
