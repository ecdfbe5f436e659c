// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Month overview for the booking calendar.
//!
//! Each day of the requested month is annotated with its off-day and weekend
//! status, how many slots are held by reservations, and how many remain.
//! "Today" is evaluated in the declared business timezone, not UTC.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, Month, Time, Weekday};

use crate::error::DomainError;
use crate::slots::{is_slot_start, slots_per_day};
use crate::types::PolicySettings;

/// One day in a month calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    /// The calendar date.
    pub date: Date,
    /// Whether the active policy closes on this weekday.
    pub is_off_day: bool,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Whether this is the current date in the business timezone.
    pub is_today: bool,
    /// Reservations holding a slot on this date.
    pub reserved_count: u32,
    /// Slots of the current grid still open on this date.
    ///
    /// Reservations that no longer sit on a slot start (after the policy
    /// changed) hold no slot of the grid and are not subtracted.
    pub available_count: u32,
}

impl CalendarDay {
    /// Day of month (1-based).
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.date.day()
    }

    /// English weekday name.
    #[must_use]
    pub fn day_name(&self) -> String {
        self.date.weekday().to_string()
    }
}

/// Builds the calendar for `year`/`month`.
///
/// `booked` maps dates to the start times of slot-holding reservations;
/// dates outside the month are ignored. A day's open slots agree with
/// [`crate::compute_available_slots`] for the same date.
///
/// # Errors
///
/// Returns `DomainError::InvalidCalendarMonth` if the month number is not
/// `1..=12` or the year is out of range.
pub fn compute_month_calendar(
    policy: &PolicySettings,
    year: i32,
    month: u8,
    booked: &BTreeMap<Date, BTreeSet<Time>>,
    today: Date,
) -> Result<Vec<CalendarDay>, DomainError> {
    let first: Date = Month::try_from(month)
        .and_then(|m| Date::from_calendar_date(year, m, 1))
        .map_err(|_| DomainError::InvalidCalendarMonth { year, month })?;

    let slots_per_open_day: u32 = count_u32(slots_per_day(policy));

    let mut days: Vec<CalendarDay> = Vec::new();
    let mut cursor: Option<Date> = Some(first);

    while let Some(date) = cursor.filter(|d| d.month() == first.month()) {
        let is_off_day: bool = policy.is_off_day(date);
        let times: Option<&BTreeSet<Time>> = booked.get(&date);
        let reserved_count: u32 = count_u32(times.map_or(0, BTreeSet::len));
        let available_count: u32 = if is_off_day {
            0
        } else {
            let on_grid: usize = times.map_or(0, |times| {
                times.iter().filter(|t| is_slot_start(policy, **t)).count()
            });
            slots_per_open_day.saturating_sub(count_u32(on_grid))
        };

        days.push(CalendarDay {
            date,
            is_off_day,
            is_weekend: matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday),
            is_today: date == today,
            reserved_count,
            available_count,
        });

        cursor = date.next_day();
    }

    Ok(days)
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Parses an IANA timezone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Returns the current date in `tz`.
///
/// # Errors
///
/// Returns an error if the chrono date cannot be represented as a `time::Date`.
pub fn today_in(tz: Tz) -> Result<Date, DomainError> {
    naive_to_date(Utc::now().with_timezone(&tz).date_naive())
}

/// Converts a `chrono::NaiveDate` to a `time::Date`.
fn naive_to_date(naive: NaiveDate) -> Result<Date, DomainError> {
    let month: u8 = u8::try_from(naive.month()).map_err(|e| DomainError::DateParseError {
        date_string: naive.to_string(),
        error: e.to_string(),
    })?;
    let day: u8 = u8::try_from(naive.day()).map_err(|e| DomainError::DateParseError {
        date_string: naive.to_string(),
        error: e.to_string(),
    })?;

    Month::try_from(month)
        .and_then(|m| Date::from_calendar_date(naive.year(), m, day))
        .map_err(|e| DomainError::DateParseError {
            date_string: naive.to_string(),
            error: e.to_string(),
        })
}
