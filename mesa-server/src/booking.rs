//! Booking rules
//!
//! Pure functions behind reservation checks: interval overlap, opening hours
//! and the booking window. No I/O here.

use chrono::{NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::utils::time::{local_to_millis, parse_date, parse_time};
use crate::utils::{AppError, AppResult, ErrorCode};

/// A half-open `[starts_at, ends_at)` window in Unix millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub starts_at: i64,
    pub ends_at: i64,
}

impl Slot {
    pub fn new(starts_at: i64, duration_minutes: i32) -> Self {
        Self {
            starts_at,
            ends_at: starts_at + i64::from(duration_minutes) * 60_000,
        }
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        overlaps(self.starts_at, self.ends_at, other.starts_at, other.ends_at)
    }
}

/// Half-open interval overlap: touching ends do not conflict
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && b_start < a_end
}

/// Requested booking after parsing
#[derive(Debug, Clone, Copy)]
pub struct BookingWindow {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub slot: Slot,
}

impl BookingWindow {
    /// Parse `YYYY-MM-DD` + `HH:MM` in the business timezone
    pub fn parse(date: &str, time: &str, duration_minutes: i32, tz: Tz) -> AppResult<Self> {
        let date = parse_date(date)?;
        let time = parse_time(time)?;
        let slot = Slot::new(local_to_millis(date, time, tz), duration_minutes);
        Ok(Self { date, time, slot })
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Reject windows starting at or before `now`
    pub fn ensure_future(&self, now: i64) -> AppResult<()> {
        if self.slot.starts_at <= now {
            return Err(AppError::with_message(
                ErrorCode::ReservationInPast,
                "Reservation must start in the future",
            ));
        }
        Ok(())
    }

    /// Reject windows outside `[opening, closing]`
    pub fn ensure_within_hours(&self, opening: &str, closing: &str) -> AppResult<()> {
        let duration = (self.slot.ends_at - self.slot.starts_at) / 60_000;
        let opening = parse_time(opening)?;
        let closing = parse_time(closing)?;
        if !within_opening_hours(self.time, duration, opening, closing) {
            return Err(AppError::with_message(
                ErrorCode::ReservationOutsideHours,
                format!(
                    "Reservations must fit between {} and {}",
                    opening.format("%H:%M"),
                    closing.format("%H:%M")
                ),
            ));
        }
        Ok(())
    }
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Whether `[start, start + duration)` fits in the opening hours
///
/// A closing time at or before the opening time means the restaurant closes
/// after midnight (e.g. 18:00-02:00).
pub fn within_opening_hours(
    start: NaiveTime,
    duration_minutes: i64,
    opening: NaiveTime,
    closing: NaiveTime,
) -> bool {
    let open = minutes_of_day(opening);
    let mut close = minutes_of_day(closing);
    if close <= open {
        close += 24 * 60;
    }

    let mut begin = minutes_of_day(start);
    if begin < open {
        // after-midnight part of an overnight opening
        begin += 24 * 60;
    }
    begin >= open && begin + duration_minutes <= close
}
