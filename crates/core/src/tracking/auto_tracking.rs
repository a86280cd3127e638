//! Auto-tracking linker.
//!
//! Books transaction lifecycle events onto every target that auto-tracks the
//! transaction's category. Each (target, transaction) pair owns at most one
//! auto-tracked contribution, holding the amount of the newest event seen for
//! that transaction. Events are ordered by [`SourceVersion`], so replaying an
//! event, or receiving events for the same transaction in any order, always
//! converges on the same `current_amount`:
//!
//! - `create` and `update` set the contribution to the event's amount when
//!   the event is newer than the one last applied, booking the difference.
//!   Older events are stale and ignored.
//! - A target the event does not apply to (another category, or a date
//!   outside its period) is set to zero for that transaction, recording the
//!   event so that an older event arriving later cannot book it again.
//! - `delete` revokes the contribution whatever its version, leaving a
//!   tombstone so that a late `create` or `update` is absorbed.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activities::{Activity, ActivityPayload};
use crate::errors::{Result, ValidationError};
use crate::targets::{
    Contribution, ContributionSource, SourceVersion, Target, TargetKind, TrackedTarget,
};

/// Lifecycle operation carried by a transaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOperation {
    Create,
    Update,
    Delete,
}

/// A transaction change reported by the transaction-management collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub transaction_id: String,
    pub category_id: String,
    /// Positive for income, negative for expenses.
    pub signed_amount: Decimal,
    pub operation: LinkOperation,
    /// When the change happened at the source; orders updates.
    pub occurred_at: DateTime<Utc>,
    /// Booking date of the transaction. Targets ignore transactions dated
    /// outside their period; `None` skips the check.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
}

impl TransactionEvent {
    /// Rejects events missing the identifiers needed to route them.
    pub fn validate(&self) -> Result<()> {
        if self.transaction_id.trim().is_empty() {
            return Err(ValidationError::MissingField("transaction_id".to_string()).into());
        }
        if self.category_id.trim().is_empty() {
            return Err(ValidationError::MissingField("category_id".to_string()).into());
        }
        Ok(())
    }

    /// Position of this event in its transaction's history.
    pub fn version(&self) -> SourceVersion {
        SourceVersion {
            occurred_at: self.occurred_at,
            category_id: self.category_id.clone(),
            transaction_date: self.transaction_date,
            signed_amount: self.signed_amount,
        }
    }
}

/// What happened to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum LinkEffect {
    /// The event was booked; `delta` is the net change to `current_amount`.
    Applied { delta: Decimal },
    /// The event had already been applied (or its transaction deleted).
    Duplicate,
    /// A newer event for the same transaction has already been applied.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub target_id: String,
    pub effect: LinkEffect,
}

/// Result of applying one event across a set of targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
    pub outcomes: Vec<LinkOutcome>,
    /// One `auto_tracked_update` per applied outcome, in target order,
    /// followed by whatever the service's refresh of those targets produced.
    pub activities: Vec<Activity>,
}

impl LinkReport {
    /// True when no target tracks the event's category and none lost it.
    pub fn is_unlinked(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Ids of targets whose current amount may have changed.
    pub fn applied_target_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.effect, LinkEffect::Applied { .. }))
            .map(|o| o.target_id.as_str())
            .collect()
    }
}

/// Amount booked on a target for a signed transaction amount.
///
/// Goals accumulate the signed amount. Budgets accumulate spend, so an
/// expense of -150 books +150 and a refund reduces spend.
pub fn booked_amount(kind: TargetKind, signed_amount: Decimal) -> Decimal {
    match kind {
        TargetKind::Goal => signed_amount,
        TargetKind::Budget => -signed_amount,
    }
}

fn accepts(target: &Target, event: &TransactionEvent) -> bool {
    if !target.tracks_category(&event.category_id) {
        return false;
    }
    match event.transaction_date {
        Some(date) => {
            date >= target.start_date && target.end_date.map_or(true, |end| date <= end)
        }
        None => true,
    }
}

/// Applies `event` to every auto-tracking target in `targets`.
///
/// Targets the event applies to always get an outcome. Other auto-tracking
/// targets only get one when their current amount moved, which happens when
/// the transaction left them through a recategorization, a date change or a
/// delete.
pub fn apply_transaction_event(
    targets: &mut [TrackedTarget],
    event: &TransactionEvent,
    now: DateTime<Utc>,
) -> LinkReport {
    let mut report = LinkReport::default();
    let version = event.version();

    for tracked in targets
        .iter_mut()
        .filter(|t| t.target.is_auto_tracking_enabled())
    {
        let accepted = accepts(&tracked.target, event);
        let booked = if accepted {
            booked_amount(tracked.target.kind(), event.signed_amount)
        } else {
            Decimal::ZERO
        };
        let effect = apply_to_target(tracked, event, &version, booked, now);

        let moved = matches!(effect, LinkEffect::Applied { delta } if !delta.is_zero());
        if !accepted && !moved {
            continue;
        }

        let target_id = tracked.target.id.clone();
        match effect {
            LinkEffect::Applied { delta } => {
                info!(
                    "Auto-tracked {:?} of transaction {} on target {}: delta {}, current {}",
                    event.operation,
                    event.transaction_id,
                    target_id,
                    delta,
                    tracked.target.current_amount
                );
                report.activities.push(Activity::new(
                    &target_id,
                    now,
                    ActivityPayload::AutoTrackedUpdate {
                        transaction_id: event.transaction_id.clone(),
                        operation: event.operation,
                        delta,
                        current_amount: tracked.target.current_amount,
                    },
                ));
            }
            LinkEffect::Duplicate | LinkEffect::Stale => {
                debug!(
                    "Absorbed {:?} of transaction {} on target {}: {:?}",
                    event.operation, event.transaction_id, target_id, effect
                );
            }
        }
        report.outcomes.push(LinkOutcome { target_id, effect });
    }

    if report.is_unlinked() {
        debug!(
            "No auto-tracked target for category {} (transaction {})",
            event.category_id, event.transaction_id
        );
    }

    report
}

fn apply_to_target(
    tracked: &mut TrackedTarget,
    event: &TransactionEvent,
    version: &SourceVersion,
    booked: Decimal,
    now: DateTime<Utc>,
) -> LinkEffect {
    let target_id = tracked.target.id.clone();

    let position = tracked.contributions.iter().position(|c| {
        c.is_auto_tracked() && c.source_transaction_id.as_deref() == Some(event.transaction_id.as_str())
    });

    let delta = match (event.operation, position) {
        (LinkOperation::Create | LinkOperation::Update, None) => {
            tracked
                .contributions
                .push(new_entry(&target_id, event, version, booked, None));
            booked
        }
        (LinkOperation::Create | LinkOperation::Update, Some(index)) => {
            let entry = &mut tracked.contributions[index];
            if !entry.is_live() {
                return LinkEffect::Duplicate;
            }
            match entry.source_version.as_ref().map(|applied| version.cmp(applied)) {
                Some(Ordering::Less) => return LinkEffect::Stale,
                Some(Ordering::Equal) => return LinkEffect::Duplicate,
                Some(Ordering::Greater) | None => {}
            }
            let delta = booked.saturating_sub(entry.amount);
            entry.amount = booked;
            entry.source_version = Some(version.clone());
            delta
        }
        (LinkOperation::Delete, Some(index)) => {
            let entry = &mut tracked.contributions[index];
            if !entry.is_live() {
                return LinkEffect::Duplicate;
            }
            entry.revoked_at = Some(now);
            entry.source_version = Some(version.clone());
            -entry.amount
        }
        (LinkOperation::Delete, None) => {
            // Deleted before its create arrived: keep a tombstone only.
            tracked
                .contributions
                .push(new_entry(&target_id, event, version, Decimal::ZERO, Some(now)));
            Decimal::ZERO
        }
    };

    tracked.target.current_amount = tracked.target.current_amount.saturating_add(delta);
    LinkEffect::Applied { delta }
}

fn new_entry(
    target_id: &str,
    event: &TransactionEvent,
    version: &SourceVersion,
    amount: Decimal,
    revoked_at: Option<DateTime<Utc>>,
) -> Contribution {
    Contribution {
        id: Uuid::new_v4().to_string(),
        target_id: target_id.to_string(),
        amount,
        contributed_at: event.occurred_at,
        source: ContributionSource::AutoTracked,
        source_transaction_id: Some(event.transaction_id.clone()),
        source_version: Some(version.clone()),
        revoked_at,
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{PeriodType, TargetDetails};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
    }

    fn tracked(id: &str, details: TargetDetails, category: &str) -> TrackedTarget {
        TrackedTarget::new(Target {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            name: id.to_string(),
            target_amount: dec!(500),
            current_amount: dec!(0),
            baseline_amount: dec!(0),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            linked_category_id: Some(category.to_string()),
            auto_track: true,
            details,
            last_progress_percentage: dec!(0),
            last_status: None,
            completed_at: None,
        })
    }

    fn event(tx: &str, amount: Decimal, operation: LinkOperation, minutes: i64) -> TransactionEvent {
        TransactionEvent {
            transaction_id: tx.to_string(),
            category_id: "food".to_string(),
            signed_amount: amount,
            operation,
            occurred_at: now() + Duration::minutes(minutes),
            transaction_date: None,
        }
    }

    fn budget() -> TrackedTarget {
        tracked("b1", TargetDetails::budget(PeriodType::Monthly), "food")
    }

    #[test]
    fn test_expense_books_as_spend_on_budget() {
        let mut targets = vec![budget()];
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());

        assert_eq!(targets[0].target.current_amount, dec!(150));
        assert_eq!(report.applied_target_ids(), vec!["b1"]);
        assert_eq!(report.activities.len(), 1);
        assert_eq!(targets[0].contributions.len(), 1);
        assert_eq!(
            targets[0].contributions[0].source_transaction_id.as_deref(),
            Some("tx1")
        );
    }

    #[test]
    fn test_replayed_create_is_duplicate() {
        let mut targets = vec![budget()];
        let create = event("tx1", dec!(-150), LinkOperation::Create, 0);
        apply_transaction_event(&mut targets, &create, now());
        let report = apply_transaction_event(&mut targets, &create, now());

        assert_eq!(targets[0].target.current_amount, dec!(150));
        assert_eq!(report.outcomes[0].effect, LinkEffect::Duplicate);
        assert!(report.activities.is_empty());
        assert_eq!(targets[0].contributions.len(), 1);
    }

    #[test]
    fn test_update_books_only_the_difference() {
        let mut targets = vec![budget()];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-200), LinkOperation::Update, 5), now());

        assert_eq!(targets[0].target.current_amount, dec!(200));
        assert_eq!(report.outcomes[0].effect, LinkEffect::Applied { delta: dec!(50) });
    }

    #[test]
    fn test_stale_update_is_ignored() {
        let mut targets = vec![budget()];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        apply_transaction_event(&mut targets, &event("tx1", dec!(-300), LinkOperation::Update, 10), now());
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-200), LinkOperation::Update, 5), now());

        assert_eq!(report.outcomes[0].effect, LinkEffect::Stale);
        assert_eq!(targets[0].target.current_amount, dec!(300));
    }

    #[test]
    fn test_delete_restores_previous_amount() {
        let mut targets = vec![budget()];
        targets[0].target.current_amount = dec!(40);
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Delete, 1), now());

        assert_eq!(targets[0].target.current_amount, dec!(40));
        assert!(!targets[0].contributions[0].is_live());
    }

    #[test]
    fn test_create_after_delete_is_absorbed() {
        let mut targets = vec![budget()];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Delete, 1), now());
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());

        assert_eq!(report.outcomes[0].effect, LinkEffect::Duplicate);
        assert_eq!(targets[0].target.current_amount, dec!(0));
    }

    #[test]
    fn test_update_without_create_upserts() {
        let mut targets = vec![budget()];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-80), LinkOperation::Update, 3), now());
        apply_transaction_event(&mut targets, &event("tx1", dec!(-50), LinkOperation::Create, 0), now());
        assert_eq!(targets[0].target.current_amount, dec!(80));
    }

    #[test]
    fn test_goal_books_signed_amount() {
        let mut targets = vec![tracked("g1", TargetDetails::goal(), "food")];
        apply_transaction_event(&mut targets, &event("tx1", dec!(250), LinkOperation::Create, 0), now());
        assert_eq!(targets[0].target.current_amount, dec!(250));
    }

    #[test]
    fn test_unlinked_category_is_noop() {
        let mut targets = vec![tracked("b1", TargetDetails::budget(PeriodType::Monthly), "rent")];
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        assert!(report.is_unlinked());
        assert_eq!(targets[0].target.current_amount, dec!(0));
    }

    #[test]
    fn test_missing_category_disables_auto_tracking() {
        let mut target = budget();
        target.target.linked_category_id = None;
        let mut targets = vec![target];
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        assert!(report.is_unlinked());
    }

    #[test]
    fn test_recategorized_transaction_leaves_old_target() {
        let mut targets = vec![
            budget(),
            tracked("b2", TargetDetails::budget(PeriodType::Monthly), "travel"),
        ];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());

        let mut moved = event("tx1", dec!(-150), LinkOperation::Update, 5);
        moved.category_id = "travel".to_string();
        let report = apply_transaction_event(&mut targets, &moved, now());

        assert_eq!(targets[0].target.current_amount, dec!(0));
        assert_eq!(targets[1].target.current_amount, dec!(150));
        assert_eq!(report.applied_target_ids(), vec!["b1", "b2"]);
    }

    #[test]
    fn test_transaction_outside_period_is_ignored() {
        let mut targets = vec![budget()];
        let mut early = event("tx1", dec!(-150), LinkOperation::Create, 0);
        early.transaction_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        let report = apply_transaction_event(&mut targets, &early, now());
        assert!(report.is_unlinked());

        let mut corrected = event("tx1", dec!(-150), LinkOperation::Update, 5);
        corrected.transaction_date = NaiveDate::from_ymd_opt(2024, 2, 29);
        apply_transaction_event(&mut targets, &corrected, now());
        assert_eq!(targets[0].target.current_amount, dec!(150));
    }

    fn food_and_travel() -> Vec<TrackedTarget> {
        vec![
            budget(),
            tracked("b2", TargetDetails::budget(PeriodType::Monthly), "travel"),
        ]
    }

    fn amounts(targets: &[TrackedTarget]) -> Vec<Decimal> {
        targets.iter().map(|t| t.target.current_amount).collect()
    }

    #[test]
    fn test_recategorization_converges_in_either_order() {
        let create = event("tx1", dec!(-150), LinkOperation::Create, 0);
        let mut moved = event("tx1", dec!(-150), LinkOperation::Update, 5);
        moved.category_id = "travel".to_string();

        let mut in_order = food_and_travel();
        apply_transaction_event(&mut in_order, &create, now());
        apply_transaction_event(&mut in_order, &moved, now());

        let mut reversed = food_and_travel();
        apply_transaction_event(&mut reversed, &moved, now());
        let report = apply_transaction_event(&mut reversed, &create, now());

        assert_eq!(amounts(&in_order), vec![dec!(0), dec!(150)]);
        assert_eq!(amounts(&reversed), vec![dec!(0), dec!(150)]);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].target_id, "b1");
        assert_eq!(report.outcomes[0].effect, LinkEffect::Stale);
        assert!(report.activities.is_empty());
    }

    #[test]
    fn test_update_moved_away_and_back_lands_once() {
        let mut moved = event("tx1", dec!(-150), LinkOperation::Update, 5);
        moved.category_id = "travel".to_string();
        let back = event("tx1", dec!(-90), LinkOperation::Update, 9);
        let events = [
            event("tx1", dec!(-150), LinkOperation::Create, 0),
            moved,
            back,
        ];

        let mut forward = food_and_travel();
        for e in &events {
            apply_transaction_event(&mut forward, e, now());
        }
        let mut backward = food_and_travel();
        for e in events.iter().rev() {
            apply_transaction_event(&mut backward, e, now());
        }

        assert_eq!(amounts(&forward), vec![dec!(90), dec!(0)]);
        assert_eq!(amounts(&backward), vec![dec!(90), dec!(0)]);
    }

    #[test]
    fn test_updates_with_equal_timestamps_resolve_the_same_way() {
        let create = event("tx1", dec!(-100), LinkOperation::Create, 0);
        let first = event("tx1", dec!(-150), LinkOperation::Update, 5);
        let second = event("tx1", dec!(-200), LinkOperation::Update, 5);

        let mut a = vec![budget()];
        for e in [&create, &first, &second] {
            apply_transaction_event(&mut a, e, now());
        }
        let mut b = vec![budget()];
        for e in [&create, &second, &first] {
            apply_transaction_event(&mut b, e, now());
        }

        assert_eq!(a[0].target.current_amount, b[0].target.current_amount);
        assert_eq!(a[0].target.current_amount, dec!(150));
    }

    #[test]
    fn test_equal_timestamps_across_categories_resolve_the_same_way() {
        let food = event("tx1", dec!(-150), LinkOperation::Update, 5);
        let mut travel = event("tx1", dec!(-150), LinkOperation::Update, 5);
        travel.category_id = "travel".to_string();

        let mut a = food_and_travel();
        apply_transaction_event(&mut a, &food, now());
        apply_transaction_event(&mut a, &travel, now());
        let mut b = food_and_travel();
        apply_transaction_event(&mut b, &travel, now());
        apply_transaction_event(&mut b, &food, now());

        assert_eq!(amounts(&a), amounts(&b));
        assert_eq!(amounts(&a), vec![dec!(0), dec!(150)]);
    }

    #[test]
    fn test_non_matching_targets_stay_silent() {
        let mut targets = food_and_travel();
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());

        assert_eq!(report.applied_target_ids(), vec!["b1"]);
        assert_eq!(report.activities.len(), 1);
        let marker = targets[1].auto_tracked_entry("tx1").unwrap();
        assert_eq!(marker.amount, dec!(0));
        assert!(marker.is_live());
    }

    #[test]
    fn test_delete_wins_over_a_newer_update() {
        let mut targets = vec![budget()];
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Create, 0), now());
        apply_transaction_event(&mut targets, &event("tx1", dec!(-150), LinkOperation::Delete, 3), now());
        let report =
            apply_transaction_event(&mut targets, &event("tx1", dec!(-400), LinkOperation::Update, 9), now());

        assert_eq!(report.outcomes[0].effect, LinkEffect::Duplicate);
        assert_eq!(targets[0].target.current_amount, dec!(0));
    }

    #[test]
    fn test_event_validation() {
        let mut bad = event("", dec!(1), LinkOperation::Create, 0);
        assert!(bad.validate().is_err());
        bad.transaction_id = "tx".to_string();
        bad.category_id = " ".to_string();
        assert!(bad.validate().is_err());
        bad.category_id = "food".to_string();
        assert!(bad.validate().is_ok());
    }
}
