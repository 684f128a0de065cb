//! Time normalisation and flight interval helpers.
//!
//! Departure instants are naive local date-times, the same representation
//! the store keeps (separate DATE and TIME columns). Arrival is always
//! derived from the departure plus the route duration.

use crate::utils::error::{AppError, AppResult};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;

/// Parses `HH`, `HH:MM` or `HH:MM:SS` into a time of day.
pub fn parse_time_of_day(text: &str) -> AppResult<NaiveTime> {
    let invalid = || AppError::ValidationFailed(format!("Invalid time of day: '{}'", text));

    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid());
    }

    let mut fields = [0u32; 3];
    for (slot, part) in fields.iter_mut().zip(parts.iter()) {
        *slot = part.trim().parse().map_err(|_| invalid())?;
    }

    NaiveTime::from_hms_opt(fields[0], fields[1], fields[2]).ok_or_else(invalid)
}

pub fn parse_date(text: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::ValidationFailed(format!("Invalid date (expected YYYY-MM-DD): '{}'", text)))
}

pub fn departure_instant(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

pub fn arrival_instant(date: NaiveDate, time: NaiveTime, duration_minutes: i64) -> NaiveDateTime {
    departure_instant(date, time) + Duration::minutes(duration_minutes.max(0))
}

/// Half-open overlap of `[a_start, a_end)` and `[b_start, b_end)`.
/// Intervals that only touch at an endpoint do not overlap.
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Source of "now" for lead-time and future-departure rules.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
