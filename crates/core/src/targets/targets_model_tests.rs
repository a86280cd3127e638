//! Tests for target domain models.

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn create_test_target(details: TargetDetails) -> Target {
    Target {
        id: "t1".to_string(),
        owner_id: "u1".to_string(),
        name: "Emergency fund".to_string(),
        target_amount: dec!(1000),
        current_amount: dec!(0),
        baseline_amount: dec!(200),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
        linked_category_id: Some("cat-food".to_string()),
        auto_track: true,
        details,
        last_progress_percentage: dec!(0),
        last_status: None,
        completed_at: None,
    }
}

// ==================== Kind & Details ====================

#[test]
fn test_kind_follows_details() {
    let goal = create_test_target(TargetDetails::goal());
    assert_eq!(goal.kind(), TargetKind::Goal);
    assert_eq!(goal.goal_status(), Some(GoalStatus::Active));

    let budget = create_test_target(TargetDetails::budget(PeriodType::Weekly));
    assert_eq!(budget.kind(), TargetKind::Budget);
    assert_eq!(budget.goal_status(), None);
    assert_eq!(budget.priority(), GoalPriority::Medium);
}

#[test]
fn test_period_lengths() {
    assert_eq!(PeriodType::Weekly.length_days(), 7);
    assert_eq!(PeriodType::Monthly.length_days(), 30);
    assert_eq!(PeriodType::Yearly.length_days(), 365);
}

#[test]
fn test_priority_ordering() {
    assert!(GoalPriority::Urgent > GoalPriority::High);
    assert!(GoalPriority::High > GoalPriority::Medium);
    assert!(GoalPriority::Medium > GoalPriority::Low);
}

// ==================== Auto-tracking eligibility ====================

#[test]
fn test_auto_tracking_requires_category() {
    let mut target = create_test_target(TargetDetails::goal());
    assert!(target.is_auto_tracking_enabled());
    assert!(target.tracks_category("cat-food"));
    assert!(!target.tracks_category("cat-rent"));

    target.linked_category_id = None;
    assert!(!target.is_auto_tracking_enabled());
    assert!(!target.tracks_category("cat-food"));
}

#[test]
fn test_auto_tracking_requires_flag() {
    let mut target = create_test_target(TargetDetails::goal());
    target.auto_track = false;
    assert!(!target.tracks_category("cat-food"));
}

// ==================== Milestones ====================

#[test]
fn test_milestone_amount_uses_baseline() {
    let target = create_test_target(TargetDetails::goal());
    let milestone = Milestone {
        id: "m1".to_string(),
        target_id: "t1".to_string(),
        name: "Halfway".to_string(),
        threshold_percentage: dec!(50),
        status: MilestoneStatus::Pending,
        achieved_at: None,
        reward_points: 10,
    };
    // 200 + (1000 - 200) * 50%
    assert_eq!(milestone.amount_for(&target), dec!(600));
}

// ==================== Serialization ====================

#[test]
fn test_target_serializes_kind_inline() {
    let target = create_test_target(TargetDetails::budget(PeriodType::Monthly));
    let json = serde_json::to_value(&target).unwrap();
    assert_eq!(json["kind"], "budget");
    assert_eq!(json["period"], "monthly");

    let parsed: Target = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, target);
}

#[test]
fn test_goal_details_defaults_on_deserialize() {
    let json = serde_json::json!({
        "id": "g1",
        "owner_id": "u1",
        "name": "Trip",
        "target_amount": 500,
        "current_amount": 0,
        "start_date": "2024-01-01",
        "end_date": null,
        "linked_category_id": null,
        "kind": "goal"
    });
    let target: Target = serde_json::from_value(json).unwrap();
    assert_eq!(target.goal_status(), Some(GoalStatus::Active));
    assert_eq!(target.priority(), GoalPriority::Medium);
    assert_eq!(target.baseline_amount, dec!(0));
    assert!(!target.auto_track);
}

#[test]
fn test_enum_wire_names() {
    assert_eq!(
        serde_json::to_string(&GoalType::DebtPayoff).unwrap(),
        "\"debt_payoff\""
    );
    assert_eq!(
        serde_json::to_string(&ContributionSource::AutoTracked).unwrap(),
        "\"auto_tracked\""
    );
    assert_eq!(
        serde_json::from_str::<GoalStatus>("\"cancelled\"").unwrap(),
        GoalStatus::Cancelled
    );
}
