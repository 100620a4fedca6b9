use chrono::{DateTime, Duration, NaiveDate, TimeZone};

/// Absolute number of calendar days between two dates.
///
/// `NaiveDate` carries no time-of-day, so the difference is always a whole
/// number of days and never under-counts across DST shifts.
pub fn day_difference(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// Strip the time-of-day from a timestamp, keeping its local calendar day.
pub fn calendar_day<Tz: TimeZone>(at: &DateTime<Tz>) -> NaiveDate {
    at.date_naive()
}

/// Day difference between two timestamps, normalized to calendar days first.
pub fn day_difference_between<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> i64 {
    day_difference(calendar_day(a), calendar_day(b))
}

/// Inclusive range check. With no `end`, only `start` itself matches.
pub fn is_date_in_range(date: NaiveDate, start: NaiveDate, end: Option<NaiveDate>) -> bool {
    match end {
        None => date == start,
        Some(end) => start <= date && date <= end,
    }
}

/// Shift by `days`, saturating at the ends of the representable calendar.
pub(crate) fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}
