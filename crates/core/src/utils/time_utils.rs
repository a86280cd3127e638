use chrono::{DateTime, NaiveDate, Utc};

/// Signed number of calendar days from `start` to `end`.
///
/// Negative when `end` is before `start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Calendar date of a UTC instant.
///
/// Tracking windows are day-granular; the host application decides which
/// instant represents "now" and passes it in.
pub fn as_of_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Returns the date `days` after `date`, saturating at the calendar maximum.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    chrono::Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(NaiveDate::MAX)
}
