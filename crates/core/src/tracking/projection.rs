//! Projection engine.
//!
//! Extrapolates the average daily rate observed so far to the end of the
//! period. Only targets with an end date get a projection.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time_window::TimeWindow;
use crate::constants::DECIMAL_PRECISION;
use crate::utils::time_utils::add_days;

/// One dated amount from a target's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedAmount {
    pub amount: Decimal,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub daily_average: Decimal,
    pub projected_total: Decimal,
    /// Date on which the target amount is reached at the current rate,
    /// `None` when the rate is not positive or the target is already reached.
    pub reaches_target_on: Option<NaiveDate>,
    /// Whether the projected total ends above the target amount.
    pub will_exceed: bool,
}

/// Projects a target's value at the end of its window.
///
/// `history` holds the live contribution (or spend) amounts; only those
/// dated within `[start, as_of]` count towards the daily average. Returns
/// `None` for open-ended windows.
pub fn project(
    history: &[DatedAmount],
    start: NaiveDate,
    as_of: NaiveDate,
    window: &TimeWindow,
    current_amount: Decimal,
    target_amount: Decimal,
) -> Option<Projection> {
    let remaining_days = window.remaining_days?;

    let observed: Decimal = history
        .iter()
        .filter(|entry| {
            let date = entry.at.date_naive();
            date >= start && date <= as_of
        })
        .fold(Decimal::ZERO, |sum, entry| sum.saturating_add(entry.amount));

    let daily_average =
        (observed / Decimal::from(window.elapsed_days.max(1))).round_dp(DECIMAL_PRECISION);
    let projected_total =
        current_amount.saturating_add(daily_average.saturating_mul(Decimal::from(remaining_days)));

    let reaches_target_on = if daily_average > Decimal::ZERO && current_amount < target_amount {
        target_amount
            .saturating_sub(current_amount)
            .checked_div(daily_average)
            .and_then(|days_needed| i64::try_from(days_needed.ceil()).ok())
            .map(|days| add_days(as_of, days))
    } else {
        None
    };

    Some(Projection {
        daily_average,
        projected_total,
        reaches_target_on,
        will_exceed: projected_total > target_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::time_window::resolve_time_window;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn at(d: u32, amount: Decimal) -> DatedAmount {
        DatedAmount {
            amount,
            at: Utc.with_ymd_and_hms(2024, 4, d, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_budget_spend_projection() {
        // April 1..30 window, 10 days in, 300 spent
        let window = resolve_time_window(date(1), Some(date(30)), date(11));
        let history = vec![at(2, dec!(100)), at(5, dec!(120)), at(9, dec!(80))];
        let projection = project(&history, date(1), date(11), &window, dec!(300), dec!(600)).unwrap();

        assert_eq!(projection.daily_average, dec!(30));
        // 300 + 30 * 19
        assert_eq!(projection.projected_total, dec!(870));
        assert!(projection.will_exceed);
        assert_eq!(projection.reaches_target_on, Some(date(21)));
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let window = resolve_time_window(date(10), Some(date(30)), date(20));
        let history = vec![
            at(5, dec!(1000)), // before start
            at(15, dec!(100)),
            at(25, dec!(1000)), // after as-of
        ];
        let projection = project(&history, date(10), date(20), &window, dec!(100), dec!(500)).unwrap();
        assert_eq!(projection.daily_average, dec!(10));
        assert_eq!(projection.projected_total, dec!(200));
        assert!(!projection.will_exceed);
    }

    #[test]
    fn test_no_growth_after_end() {
        let window = resolve_time_window(date(1), Some(date(10)), date(20));
        let history = vec![at(3, dec!(90))];
        let projection = project(&history, date(1), date(20), &window, dec!(90), dec!(100)).unwrap();
        assert_eq!(projection.projected_total, dec!(90));
    }

    #[test]
    fn test_first_day_divides_by_one() {
        let window = resolve_time_window(date(1), Some(date(30)), date(1));
        let history = vec![at(1, dec!(50))];
        let projection = project(&history, date(1), date(1), &window, dec!(50), dec!(500)).unwrap();
        assert_eq!(projection.daily_average, dec!(50));
    }

    #[test]
    fn test_open_ended_has_no_projection() {
        let window = resolve_time_window(date(1), None, date(15));
        assert!(project(&[at(2, dec!(10))], date(1), date(15), &window, dec!(10), dec!(100)).is_none());
    }

    #[test]
    fn test_no_reach_date_without_positive_rate() {
        let window = resolve_time_window(date(1), Some(date(30)), date(11));
        let projection = project(&[], date(1), date(11), &window, dec!(0), dec!(100)).unwrap();
        assert_eq!(projection.daily_average, dec!(0));
        assert_eq!(projection.reaches_target_on, None);
    }
}
