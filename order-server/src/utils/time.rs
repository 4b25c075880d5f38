//! Business time zone conversions
//!
//! Calendar dates are turned into Unix-millis windows here; the repository
//! layer only ever sees `i64`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use shared::error::{AppError, AppResult};

/// Longest range a report may span, in days
pub const MAX_REPORT_DAYS: i64 = 366;

/// Parse `YYYY-MM-DD`
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Today's date in the business time zone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Local wall-clock time → Unix millis.
///
/// Ambiguous times (DST fold) take the earlier instant; times inside a DST
/// gap fall back to UTC.
fn local_to_millis(naive: NaiveDateTime, tz: Tz) -> i64 {
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Local midnight of `date`
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_to_millis(date.and_time(NaiveTime::MIN), tz)
}

/// Local midnight of the following day; use with `< end`.
///
/// At millisecond resolution this is the same window as ending at
/// 23:59:59.999999999.
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    match date.succ_opt() {
        Some(next) => day_start_millis(next, tz),
        None => {
            local_to_millis(date.and_time(NaiveTime::MIN), tz)
                + Duration::days(1).num_milliseconds()
        }
    }
}

/// Every calendar date from `begin` to `end`, inclusive and ascending
pub fn date_sequence(begin: NaiveDate, end: NaiveDate) -> AppResult<Vec<NaiveDate>> {
    if end < begin {
        return Err(AppError::invalid_date_range(format!(
            "End date {end} is before begin date {begin}"
        ))
        .with_detail("begin", begin.to_string())
        .with_detail("end", end.to_string()));
    }
    let days = (end - begin).num_days() + 1;
    if days > MAX_REPORT_DAYS {
        return Err(AppError::invalid_date_range(format!(
            "Range spans {days} days, at most {MAX_REPORT_DAYS} allowed"
        )));
    }
    Ok(begin.iter_days().take(days as usize).collect())
}
