//! Business timezone conversions
//!
//! Dates and wall-clock times arrive as `YYYY-MM-DD` / `HH:MM` strings in the
//! restaurant's timezone. They are converted to Unix millis here, at the
//! handler layer; repositories only see `i64`.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {date}")))
}

/// Parse a wall-clock time (HH:MM)
pub fn parse_time(time: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {time}")))
}

/// Date + time -> Unix millis (business timezone)
///
/// DST gap fallback: a local time that does not exist is read as UTC.
pub fn local_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00) -> Unix millis (business timezone)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_to_millis(date, NaiveTime::MIN, tz)
}

/// End of day -> next day's 00:00 in Unix millis (business timezone)
///
/// Callers use `< end` (exclusive).
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Unix millis -> business date string (YYYY-MM-DD)
pub fn millis_to_local_date(millis: i64, tz: Tz) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&tz).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Today in the business timezone
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse a timezone name, e.g. `Europe/Lisbon`
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISBON: Tz = chrono_tz::Europe::Lisbon;

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_date("2030-02-30").is_err());
        assert!(parse_date("30/01/2030").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("7pm").is_err());
        assert_eq!(
            parse_time("19:30").unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap()
        );
    }

    #[test]
    fn local_time_respects_summer_offset() {
        // Lisbon is UTC+1 in July
        let date = parse_date("2030-07-01").unwrap();
        let time = parse_time("20:00").unwrap();
        let millis = local_to_millis(date, time, LISBON);
        let utc = chrono::DateTime::from_timestamp_millis(millis).unwrap();
        assert_eq!(utc.format("%H:%M").to_string(), "19:00");
    }

    #[test]
    fn day_bounds_cover_24_hours_outside_dst_changes() {
        let date = parse_date("2030-01-15").unwrap();
        let start = day_start_millis(date, LISBON);
        let end = day_end_millis(date, LISBON);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        assert_eq!(millis_to_local_date(start, LISBON), "2030-01-15");
        assert_eq!(millis_to_local_date(end - 1, LISBON), "2030-01-15");
    }

    #[test]
    fn month_start_is_first_day() {
        let date = parse_date("2030-03-17").unwrap();
        assert_eq!(month_start(date), parse_date("2030-03-01").unwrap());
    }

    #[test]
    fn timezone_names() {
        assert_eq!(parse_timezone("Europe/Lisbon"), Some(LISBON));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }
}
