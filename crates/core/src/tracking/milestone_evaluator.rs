//! Milestone evaluation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::activities::{Activity, ActivityPayload};
use crate::errors::{Result, TargetError};
use crate::targets::{MilestoneStatus, TrackedTarget};

/// Marks every pending milestone whose threshold lies in
/// `(previous_percentage, new_percentage]` as achieved.
///
/// Milestones are visited in ascending threshold order so that a single large
/// contribution crossing several thresholds yields one activity per milestone,
/// in order. Achieved and skipped milestones are never touched, and a falling
/// percentage achieves nothing.
pub fn evaluate_milestones(
    tracked: &mut TrackedTarget,
    previous_percentage: Decimal,
    new_percentage: Decimal,
    now: DateTime<Utc>,
) -> Vec<Activity> {
    if new_percentage <= previous_percentage {
        return Vec::new();
    }

    let mut crossed: Vec<usize> = tracked
        .milestones
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            m.is_pending()
                && m.threshold_percentage > previous_percentage
                && m.threshold_percentage <= new_percentage
        })
        .map(|(index, _)| index)
        .collect();
    crossed.sort_by(|a, b| {
        let (ma, mb) = (&tracked.milestones[*a], &tracked.milestones[*b]);
        ma.threshold_percentage
            .cmp(&mb.threshold_percentage)
            .then_with(|| ma.id.cmp(&mb.id))
    });

    let current_amount = tracked.target.current_amount;
    let target_id = tracked.target.id.clone();

    crossed
        .into_iter()
        .map(|index| {
            let milestone = &mut tracked.milestones[index];
            milestone.status = MilestoneStatus::Achieved;
            milestone.achieved_at = Some(now);
            Activity::new(
                &target_id,
                now,
                ActivityPayload::MilestoneAchieved {
                    milestone_id: milestone.id.clone(),
                    milestone_name: milestone.name.clone(),
                    threshold_percentage: milestone.threshold_percentage,
                    current_amount,
                    reward_points: milestone.reward_points,
                },
            )
        })
        .collect()
}

/// Skips a pending milestone so it is never evaluated again.
///
/// Skipping an already skipped milestone is a no-op; an achieved milestone
/// cannot be skipped.
pub fn skip_milestone(tracked: &mut TrackedTarget, milestone_id: &str, now: DateTime<Utc>) -> Result<()> {
    let milestone = tracked
        .milestones
        .iter_mut()
        .find(|m| m.id == milestone_id)
        .ok_or_else(|| TargetError::MilestoneNotFound(milestone_id.to_string()))?;

    match milestone.status {
        MilestoneStatus::Achieved => {
            Err(TargetError::MilestoneAlreadyAchieved(milestone_id.to_string()).into())
        }
        MilestoneStatus::Skipped => Ok(()),
        MilestoneStatus::Pending => {
            milestone.status = MilestoneStatus::Skipped;
            milestone.achieved_at = None;
            log::debug!("Skipped milestone {} at {}", milestone_id, now);
            Ok(())
        }
    }
}
