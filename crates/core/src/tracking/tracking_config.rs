//! Tunable thresholds for classification and alerting.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUDGET_INFO_THRESHOLD, DEFAULT_BUDGET_LIMIT_THRESHOLD,
    DEFAULT_BUDGET_WARNING_THRESHOLD, DEFAULT_ON_TRACK_TOLERANCE,
};
use crate::errors::{Error, Result};
use crate::targets::PeriodType;

/// Configuration for the tracking engine.
///
/// Every boundary used by the classifier and alert generator lives here so
/// that deployments can override them without touching the rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingConfig {
    /// Percentage points a target may trail the time-proportional expectation
    /// and still count as on track (default: 0)
    pub on_track_tolerance: Decimal,

    /// Budget usage (%) that raises an informational notice (default: 75)
    pub budget_info_threshold: Decimal,

    /// Budget usage (%) that enters the warning band (default: 80)
    pub budget_warning_threshold: Decimal,

    /// Budget usage (%) at which the budget is exhausted (default: 100)
    pub budget_limit_threshold: Decimal,

    /// Period used for a goal's recommended contribution (default: monthly)
    pub default_contribution_period: PeriodType,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            on_track_tolerance: DEFAULT_ON_TRACK_TOLERANCE,
            budget_info_threshold: DEFAULT_BUDGET_INFO_THRESHOLD,
            budget_warning_threshold: DEFAULT_BUDGET_WARNING_THRESHOLD,
            budget_limit_threshold: DEFAULT_BUDGET_LIMIT_THRESHOLD,
            default_contribution_period: PeriodType::Monthly,
        }
    }
}

impl TrackingConfig {
    /// Checks that the tolerance is non-negative and the budget thresholds
    /// are positive and strictly ascending (info < warning < limit).
    pub fn validate(&self) -> Result<()> {
        if self.on_track_tolerance.is_sign_negative() {
            return Err(invalid(format!(
                "onTrackTolerance must not be negative (got {})",
                self.on_track_tolerance
            )));
        }
        if self.budget_info_threshold <= Decimal::ZERO {
            return Err(invalid(format!(
                "budgetInfoThreshold must be positive (got {})",
                self.budget_info_threshold
            )));
        }
        if self.budget_info_threshold >= self.budget_warning_threshold {
            return Err(invalid(format!(
                "budgetInfoThreshold ({}) must be below budgetWarningThreshold ({})",
                self.budget_info_threshold, self.budget_warning_threshold
            )));
        }
        if self.budget_warning_threshold >= self.budget_limit_threshold {
            return Err(invalid(format!(
                "budgetWarningThreshold ({}) must be below budgetLimitThreshold ({})",
                self.budget_warning_threshold, self.budget_limit_threshold
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> Error {
    warn!("Rejected tracking configuration: {}", message);
    Error::InvalidConfigValue(message)
}
