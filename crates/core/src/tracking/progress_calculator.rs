//! Progress calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time_window::TimeWindow;
use crate::constants::{DECIMAL_PRECISION, PERCENT_MAX};

/// Derived progress figures of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Always within `[0, 100]`.
    pub progress_percentage: Decimal,
    /// Never negative.
    pub remaining_amount: Decimal,
    /// Amount needed per period to close the gap by the end date; `None`
    /// when there is no end date or no time left.
    pub recommended_periodic_amount: Option<Decimal>,
}

/// Percentage of the way from `baseline` to `target` that `current` has
/// travelled, clamped to `[0, 100]`.
///
/// A degenerate span (target at or below baseline) reads as 100 once the
/// target amount is reached and 0 otherwise.
pub fn progress_percentage(current: Decimal, target: Decimal, baseline: Decimal) -> Decimal {
    if target <= baseline {
        return if current >= target {
            PERCENT_MAX
        } else {
            Decimal::ZERO
        };
    }

    match travelled_share(current, target, baseline)
        .or_else(|| halved_travelled_share(current, target, baseline))
    {
        Some(pct) => pct.clamp(Decimal::ZERO, PERCENT_MAX),
        None if current > baseline => PERCENT_MAX,
        None => Decimal::ZERO,
    }
}

fn travelled_share(current: Decimal, target: Decimal, baseline: Decimal) -> Option<Decimal> {
    let span = target.checked_sub(baseline)?;
    current
        .checked_sub(baseline)?
        .checked_mul(PERCENT_MAX)?
        .checked_div(span)
}

// Amounts near the ends of the Decimal range: halving keeps both differences
// representable.
fn halved_travelled_share(current: Decimal, target: Decimal, baseline: Decimal) -> Option<Decimal> {
    let half_baseline = baseline / Decimal::TWO;
    let span = (target / Decimal::TWO).checked_sub(half_baseline)?;
    (current / Decimal::TWO)
        .checked_sub(half_baseline)?
        .checked_div(span)?
        .checked_mul(PERCENT_MAX)
}

/// Computes progress for a target as of the given window.
///
/// `period_length_days` is the length of one contribution period (for
/// example 30 for a monthly cadence).
pub fn calculate_progress(
    current: Decimal,
    target: Decimal,
    baseline: Decimal,
    window: &TimeWindow,
    period_length_days: i64,
) -> Progress {
    let remaining_amount = target.saturating_sub(current).max(Decimal::ZERO);

    let recommended_periodic_amount = match window.remaining_days {
        Some(days) if days > 0 => {
            let periods = (Decimal::from(days) / Decimal::from(period_length_days.max(1)))
                .max(Decimal::ONE);
            Some((remaining_amount / periods).round_dp(DECIMAL_PRECISION))
        }
        _ => None,
    };

    Progress {
        progress_percentage: progress_percentage(current, target, baseline),
        remaining_amount,
        recommended_periodic_amount,
    }
}
