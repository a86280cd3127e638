//! Tracking service tying the calculators, linker and alert rules together.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::alert_generator::{alerts_for, AlertContext};
use super::alerts_model::{sort_alerts, Alert};
use super::auto_tracking::{self, LinkReport, TransactionEvent};
use super::milestone_evaluator::{evaluate_milestones, skip_milestone};
use super::progress_calculator::calculate_progress;
use super::projection::{project, DatedAmount};
use super::status_classifier::{budget_usage_percentage, classify, TargetStatus};
use super::time_window::resolve_time_window;
use super::tracking_config::TrackingConfig;
use super::tracking_model::{GoalCommand, TargetView, TargetsSummary};
use super::tracking_traits::TrackingServiceTrait;
use crate::activities::{Activity, ActivityPayload, ActivitySink};
use crate::errors::{Result, TargetError, ValidationError};
use crate::targets::{
    Contribution, ContributionSource, GoalStatus, Target, TargetDetails, TargetKind, TrackedTarget,
};
use crate::utils::time_utils::as_of_date;

/// Service evaluating goals and budgets and applying changes to them.
///
/// Stateless apart from its configuration: targets come in as snapshots and
/// every generated activity is pushed through the activity sink.
pub struct TrackingService {
    config: TrackingConfig,
    activity_sink: Arc<dyn ActivitySink>,
}

impl TrackingService {
    /// Creates a service with the default configuration.
    pub fn new(activity_sink: Arc<dyn ActivitySink>) -> Self {
        Self {
            config: TrackingConfig::default(),
            activity_sink,
        }
    }

    /// Creates a service with a custom configuration, rejecting invalid values.
    pub fn with_config(config: TrackingConfig, activity_sink: Arc<dyn ActivitySink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            activity_sink,
        })
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    fn period_length_days(&self, target: &Target) -> i64 {
        match target.details {
            TargetDetails::Budget { period } => period.length_days(),
            TargetDetails::Goal { .. } => self.config.default_contribution_period.length_days(),
        }
    }

    fn history(tracked: &TrackedTarget) -> Vec<DatedAmount> {
        tracked
            .live_contributions()
            .map(|c| DatedAmount {
                amount: c.amount,
                at: c.contributed_at,
            })
            .collect()
    }
}

impl TrackingServiceTrait for TrackingService {
    fn evaluate(&self, tracked: &TrackedTarget, now: DateTime<Utc>) -> TargetView {
        let target = &tracked.target;
        let as_of = as_of_date(now);

        let window = resolve_time_window(target.start_date, target.end_date, as_of);
        let progress = calculate_progress(
            target.current_amount,
            target.target_amount,
            target.baseline_amount,
            &window,
            self.period_length_days(target),
        );
        let classification = classify(target, &window, &progress, &self.config);

        let projection = match classification.status {
            TargetStatus::ConfigurationInvalid => None,
            _ => project(
                &Self::history(tracked),
                target.start_date,
                as_of,
                &window,
                target.current_amount,
                target.target_amount,
            ),
        };

        let alerts = alerts_for(
            &AlertContext {
                target,
                window: &window,
                classification: &classification,
                progress: &progress,
                projection: projection.as_ref(),
            },
            &self.config,
        );

        let usage_percentage = match target.kind() {
            TargetKind::Budget => Some(budget_usage_percentage(
                target.current_amount,
                target.target_amount,
            )),
            TargetKind::Goal => None,
        };

        TargetView {
            target_id: target.id.clone(),
            kind: target.kind(),
            target_amount: target.target_amount,
            current_amount: target.current_amount,
            progress_percentage: progress.progress_percentage,
            remaining_amount: progress.remaining_amount,
            recommended_periodic_amount: progress.recommended_periodic_amount,
            usage_percentage,
            status: classification.status,
            is_on_track: classification.is_on_track,
            is_overdue: classification.is_overdue,
            total_days: window.total_days,
            elapsed_days: window.elapsed_days,
            remaining_days: window.remaining_days,
            projected_total: projection.map(|p| p.projected_total),
            daily_average: projection.map(|p| p.daily_average),
            reaches_target_on: projection.and_then(|p| p.reaches_target_on),
            will_exceed: projection.is_some_and(|p| p.will_exceed),
            alerts,
        }
    }

    fn evaluate_all(&self, targets: &[TrackedTarget], now: DateTime<Utc>) -> Vec<TargetView> {
        targets.iter().map(|tracked| self.evaluate(tracked, now)).collect()
    }

    /// Re-evaluates a target after a change and updates its bookkeeping.
    ///
    /// Achieves newly crossed milestones, records a status change against the
    /// previously seen status and stamps `completed_at` on first completion.
    fn refresh(&self, tracked: &mut TrackedTarget, now: DateTime<Utc>) -> Vec<Activity> {
        let view = self.evaluate(tracked, now);
        let mut activities = Vec::new();

        let evaluates_milestones = !matches!(
            view.status,
            TargetStatus::ConfigurationInvalid | TargetStatus::Goal(GoalStatus::Cancelled)
        );
        if evaluates_milestones {
            let previous = tracked.target.last_progress_percentage;
            activities.extend(evaluate_milestones(
                tracked,
                previous,
                view.progress_percentage,
                now,
            ));
        }

        let target = &mut tracked.target;
        if target.last_status != Some(view.status) {
            debug!(
                "Target {} status {} -> {}",
                target.id,
                target.last_status.map_or("none", |s| s.as_str()),
                view.status
            );
            activities.push(Activity::new(
                &target.id,
                now,
                ActivityPayload::StatusChanged {
                    from: target.last_status,
                    to: view.status,
                },
            ));
        }

        if view.status.is_completed() && target.completed_at.is_none() {
            info!("Target {} completed", target.id);
            target.completed_at = Some(now);
        }

        target.last_status = Some(view.status);
        target.last_progress_percentage = view.progress_percentage;

        self.activity_sink.emit_batch(activities.clone());
        activities
    }

    fn add_contribution(
        &self,
        tracked: &mut TrackedTarget,
        amount: Decimal,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<Vec<Activity>> {
        let target_id = tracked.target.id.clone();

        if tracked.target.goal_status() == Some(GoalStatus::Cancelled) {
            return Err(TargetError::Cancelled(target_id).into());
        }
        if amount.is_zero() {
            return Err(ValidationError::InvalidInput(
                "Contribution amount must not be zero".to_string(),
            )
            .into());
        }

        let contribution = Contribution {
            id: Uuid::new_v4().to_string(),
            target_id: target_id.clone(),
            amount,
            contributed_at: at,
            source: ContributionSource::Manual,
            source_transaction_id: None,
            source_version: None,
            revoked_at: None,
            note: note.clone(),
        };
        let contribution_id = contribution.id.clone();
        tracked.contributions.push(contribution);
        tracked.target.current_amount = tracked.target.current_amount.saturating_add(amount);

        info!(
            "Added contribution {} of {} to target {}",
            contribution_id, amount, target_id
        );

        let added = Activity::new(
            &target_id,
            at,
            ActivityPayload::ContributionAdded {
                contribution_id,
                amount,
                current_amount: tracked.target.current_amount,
                note,
            },
        );
        self.activity_sink.emit(added.clone());

        let mut activities = vec![added];
        activities.extend(self.refresh(tracked, at));
        Ok(activities)
    }

    fn apply_transaction_event(
        &self,
        targets: &mut [TrackedTarget],
        event: &TransactionEvent,
        now: DateTime<Utc>,
    ) -> Result<LinkReport> {
        event.validate()?;

        for tracked in targets
            .iter()
            .filter(|t| t.target.auto_track && t.target.linked_category_id.is_none())
        {
            warn!(
                "Target {} has auto-tracking enabled but no linked category; skipping",
                tracked.target.id
            );
        }

        let mut report = auto_tracking::apply_transaction_event(targets, event, now);
        self.activity_sink.emit_batch(report.activities.clone());

        let applied: HashSet<String> = report
            .applied_target_ids()
            .into_iter()
            .map(str::to_string)
            .collect();

        for tracked in targets
            .iter_mut()
            .filter(|t| applied.contains(&t.target.id))
        {
            let refreshed = self.refresh(tracked, now);
            report.activities.extend(refreshed);
        }

        Ok(report)
    }

    fn apply_goal_command(
        &self,
        tracked: &mut TrackedTarget,
        command: GoalCommand,
        now: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let target_id = tracked.target.id.clone();
        let stored = match tracked.target.goal_status() {
            Some(status) => status,
            None => {
                return Err(
                    TargetError::unsupported(target_id, TargetKind::Budget, command.as_str()).into(),
                )
            }
        };

        let current = match self.evaluate(tracked, now).status {
            TargetStatus::Goal(status) => status,
            _ => stored,
        };

        let allowed = match command {
            GoalCommand::Pause => current == GoalStatus::Active,
            GoalCommand::Resume => stored == GoalStatus::Paused,
            GoalCommand::Cancel => stored != GoalStatus::Cancelled,
        };
        if !allowed {
            return Err(TargetError::InvalidTransition {
                target_id,
                from: current,
                to: command.target_status(),
            }
            .into());
        }

        if let TargetDetails::Goal { status, .. } = &mut tracked.target.details {
            *status = command.target_status();
        }
        info!("Goal {} {}: {} -> {}", target_id, command.as_str(), current, command.target_status());

        Ok(self.refresh(tracked, now))
    }

    fn skip_milestone(
        &self,
        tracked: &mut TrackedTarget,
        milestone_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        skip_milestone(tracked, milestone_id, now)
    }

    fn detach_category(&self, targets: &mut [TrackedTarget], category_id: &str) -> Vec<String> {
        let mut detached = Vec::new();
        for tracked in targets.iter_mut() {
            let target = &mut tracked.target;
            if target.linked_category_id.as_deref() == Some(category_id) {
                target.linked_category_id = None;
                target.auto_track = false;
                detached.push(target.id.clone());
            }
        }

        if !detached.is_empty() {
            warn!(
                "Category {} removed; auto-tracking disabled on {} target(s)",
                category_id,
                detached.len()
            );
        }
        detached
    }

    fn generate_alerts(&self, targets: &[TrackedTarget], now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = targets
            .iter()
            .flat_map(|tracked| self.evaluate(tracked, now).alerts)
            .collect();
        sort_alerts(&mut alerts);
        alerts
    }

    fn summarize(&self, views: &[TargetView]) -> TargetsSummary {
        TargetsSummary::from_views(views)
    }
}
