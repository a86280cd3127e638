//! Time window resolution.
//!
//! Turns a target's declared period into day counts relative to an explicit
//! as-of date. Counting is exclusive of the start day: a window from day 0 to
//! day 100 has 100 days, 50 of which have elapsed on day 50.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::PERCENT_MAX;
use crate::utils::time_utils::days_between;

/// Day counts of a target period as of a given date.
///
/// `total_days` and `remaining_days` are `None` for open-ended periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub total_days: Option<i64>,
    pub elapsed_days: i64,
    pub remaining_days: Option<i64>,
    /// Set once the as-of date is past the end date. The end date itself
    /// still belongs to the period.
    #[serde(default)]
    pub ended: bool,
}

impl TimeWindow {
    pub fn is_open_ended(&self) -> bool {
        self.remaining_days.is_none()
    }

    /// True once the as-of date is past the end of the period.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Elapsed share of the period in percent (0 to 100).
    pub fn elapsed_percentage(&self) -> Option<Decimal> {
        self.total_days.map(|total| {
            (Decimal::from(self.elapsed_days) * PERCENT_MAX / Decimal::from(total.max(1)))
                .min(PERCENT_MAX)
        })
    }
}

/// Resolves the window for `start..end` as of `as_of`.
///
/// A zero-length window counts as a single day. `as_of` before the start
/// yields zero elapsed days; `as_of` on or after the end yields zero
/// remaining days, but the window only ends the day after. An end before the start is malformed and is resolved as a
/// single-day window; the status classifier reports it separately.
pub fn resolve_time_window(start: NaiveDate, end: Option<NaiveDate>, as_of: NaiveDate) -> TimeWindow {
    let since_start = days_between(start, as_of).max(0);

    match end {
        Some(end) => {
            let total = days_between(start, end).max(1);
            TimeWindow {
                total_days: Some(total),
                elapsed_days: since_start.min(total),
                remaining_days: Some(days_between(as_of, end).max(0)),
                ended: as_of > end,
            }
        }
        None => TimeWindow {
            total_days: None,
            elapsed_days: since_start,
            remaining_days: None,
            ended: false,
        },
    }
}
