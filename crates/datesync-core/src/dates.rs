//! `DD/MM` parsing and the dates an event is anchored to.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc};

use crate::error::SyncError;

/// Year used to anchor the first instance of every created event.
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Parse a `DD/MM` string into `(day, month)`.
///
/// Only ranges are checked (`1..=31`, `1..=12`). Whether the day exists in
/// that month is not.
pub fn parse_day_month(raw: &str) -> Result<(u32, u32), SyncError> {
    let invalid = || SyncError::InvalidDateFormat(raw.to_string());

    let mut parts = raw.trim().split('/');
    let day = parts.next().ok_or_else(invalid)?.trim();
    let month = parts.next().ok_or_else(invalid)?.trim();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((day, month))
}

/// Start and exclusive end of the all-day event for `raw` in `anchor_year`.
///
/// The start is counted forward from the first of the month, so a day past
/// the end of the month rolls into the next one (`31/04` lands on 1 May).
pub fn derive_event_dates(
    raw: &str,
    anchor_year: i32,
) -> Result<(NaiveDate, NaiveDate), SyncError> {
    let (day, month) = parse_day_month(raw)?;

    let first_of_month = NaiveDate::from_ymd_opt(anchor_year, month, 1)
        .ok_or(SyncError::InvalidAnchorYear(anchor_year))?;
    let start = first_of_month
        .checked_add_days(Days::new(u64::from(day - 1)))
        .ok_or(SyncError::InvalidAnchorYear(anchor_year))?;
    let end = start
        .checked_add_days(Days::new(1))
        .ok_or(SyncError::InvalidAnchorYear(anchor_year))?;

    Ok((start, end))
}

/// `[Jan 1 00:00:00, Dec 31 23:59:59]` of `year` in local time.
pub fn year_window(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), SyncError> {
    let start = Local
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .earliest()
        .ok_or(SyncError::InvalidAnchorYear(year))?;
    let end = Local
        .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
        .latest()
        .ok_or(SyncError::InvalidAnchorYear(year))?;

    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
