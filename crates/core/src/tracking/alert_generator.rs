//! Alert generation.
//!
//! Turns one evaluated target into a ranked list of alerts. Pure: the caller
//! resolves the window against its own "now" before getting here.

use rust_decimal::Decimal;

use super::alerts_model::*;
use super::progress_calculator::Progress;
use super::projection::Projection;
use super::status_classifier::{budget_usage_percentage, BudgetStatus, Classification, TargetStatus};
use super::time_window::TimeWindow;
use super::tracking_config::TrackingConfig;
use crate::constants::{DECIMAL_PRECISION, PERCENT_MAX};
use crate::targets::{GoalStatus, Target};

/// Everything already computed for a target that the alert rules look at.
#[derive(Debug, Clone, Copy)]
pub struct AlertContext<'a> {
    pub target: &'a Target,
    pub window: &'a TimeWindow,
    pub classification: &'a Classification,
    pub progress: &'a Progress,
    pub projection: Option<&'a Projection>,
}

/// Generates the alerts for one target, most urgent first.
pub fn alerts_for(ctx: &AlertContext<'_>, config: &TrackingConfig) -> Vec<Alert> {
    let target = ctx.target;
    let priority = target.priority();

    let mut alerts = match ctx.classification.status {
        TargetStatus::ConfigurationInvalid => vec![Alert::new(
            AlertSeverity::Warning,
            TARGET_CONFIGURATION_INVALID,
            &target.id,
            priority,
        )
        .with_action(SuggestedAction::review_target_settings())],
        TargetStatus::Goal(status) => goal_alerts(ctx, status),
        TargetStatus::Budget(status) => budget_alerts(ctx, status, config),
    };

    sort_alerts(&mut alerts);
    alerts
}

fn goal_alerts(ctx: &AlertContext<'_>, status: GoalStatus) -> Vec<Alert> {
    let target = ctx.target;
    let priority = target.priority();
    let mut alerts = Vec::new();

    if status == GoalStatus::Cancelled {
        return alerts;
    }

    if ctx.progress.progress_percentage >= PERCENT_MAX {
        alerts.push(Alert::new(AlertSeverity::Success, GOAL_COMPLETED, &target.id, priority));
        return alerts;
    }

    if ctx.classification.is_overdue {
        alerts.push(
            Alert::new(AlertSeverity::Critical, GOAL_OVERDUE, &target.id, priority)
                .with_action(SuggestedAction::extend_end_date()),
        );
    } else if status == GoalStatus::Active && !ctx.classification.is_on_track {
        alerts.push(
            Alert::new(AlertSeverity::Warning, GOAL_BEHIND_SCHEDULE, &target.id, priority)
                .with_action(SuggestedAction::increase_contribution(
                    ctx.progress.recommended_periodic_amount,
                ))
                .with_action(SuggestedAction::extend_end_date()),
        );
    }

    alerts
}

fn budget_alerts(ctx: &AlertContext<'_>, status: BudgetStatus, config: &TrackingConfig) -> Vec<Alert> {
    let target = ctx.target;
    let priority = target.priority();
    let mut alerts = Vec::new();

    if status.is_exhausted() {
        let overspend = target
            .current_amount
            .saturating_sub(target.target_amount)
            .max(Decimal::ZERO);
        alerts.push(
            Alert::new(AlertSeverity::Critical, BUDGET_OVER_BUDGET, &target.id, priority)
                .with_action(SuggestedAction::raise_budget_limit(overspend)),
        );
        return alerts;
    }

    if ctx.projection.is_some_and(|p| p.will_exceed) {
        alerts.push(
            Alert::new(AlertSeverity::Warning, BUDGET_PROJECTED_OVERSPEND, &target.id, priority)
                .with_action(SuggestedAction::reduce_spending(daily_allowance(ctx))),
        );
    }

    let usage = budget_usage_percentage(target.current_amount, target.target_amount);
    if usage >= config.budget_warning_threshold {
        alerts.push(Alert::new(AlertSeverity::Warning, BUDGET_NEAR_LIMIT, &target.id, priority));
    } else if usage >= config.budget_info_threshold {
        alerts.push(Alert::new(AlertSeverity::Info, BUDGET_USAGE_NOTICE, &target.id, priority));
    }

    alerts
}

/// Spend per remaining day that keeps a budget within its allocation.
fn daily_allowance(ctx: &AlertContext<'_>) -> Option<Decimal> {
    let remaining_days = ctx.window.remaining_days.filter(|days| *days > 0)?;
    let left = ctx
        .target
        .target_amount
        .saturating_sub(ctx.target.current_amount)
        .max(Decimal::ZERO);
    Some((left / Decimal::from(remaining_days)).round_dp(DECIMAL_PRECISION))
}
