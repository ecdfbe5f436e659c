// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Normalisation of wire-format dates and times.
//!
//! Clients send dates either as `YYYY-MM-DD` or in the mobile form
//! `Mon DD, YYYY`, and times either as 24-hour `HH:MM[:SS]` or as
//! `hh:mm AM/PM`. Everything is converted to [`time::Date`] and
//! [`time::Time`] before it reaches the slot calculator or the ledger.
//!
//! Output is always canonical: `YYYY-MM-DD` and `HH:MM`.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::error::DomainError;

const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:short case_sensitive:false] [day], [year]"),
];

const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]"),
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour repr:12 padding:none]:[minute] [period case_sensitive:false]"),
    format_description!("[hour repr:12]:[minute] [period case_sensitive:false]"),
    format_description!("[hour repr:12 padding:none]:[minute][period case_sensitive:false]"),
    format_description!("[hour repr:12]:[minute][period case_sensitive:false]"),
];

/// Parses a wire date in any accepted form.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if no accepted form matches.
pub fn parse_wire_date(input: &str) -> Result<Date, DomainError> {
    let trimmed: &str = input.trim();
    let mut last_error: Option<String> = None;

    for format in DATE_FORMATS {
        match Date::parse(trimmed, *format) {
            Ok(date) => return Ok(date),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(DomainError::DateParseError {
        date_string: input.to_string(),
        error: last_error.map_or_else(
            || String::from("expected YYYY-MM-DD or 'Mon DD, YYYY'"),
            |e| format!("expected YYYY-MM-DD or 'Mon DD, YYYY' ({e})"),
        ),
    })
}

/// Parses a wire time of day in any accepted form.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if no accepted form matches.
pub fn parse_wire_time(input: &str) -> Result<Time, DomainError> {
    let trimmed: &str = input.trim();

    for format in TIME_FORMATS {
        if let Ok(time) = Time::parse(trimmed, *format) {
            return Ok(time);
        }
    }

    Err(DomainError::TimeParseError {
        time_string: input.to_string(),
        error: String::from("expected HH:MM, HH:MM:SS or 'hh:mm AM/PM'"),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a date the way the mobile client shows it (`Oct 31, 2025`).
#[must_use]
pub fn format_display_date(date: Date) -> String {
    let month: String = date.month().to_string();
    let abbreviation: &str = month.get(..3).unwrap_or(&month);
    format!("{abbreviation} {:02}, {:04}", date.day(), date.year())
}

/// Formats a time as 24-hour `HH:MM`.
#[must_use]
pub fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Formats a time as 12-hour `hh:mm AM/PM`.
#[must_use]
pub fn format_display_time(time: Time) -> String {
    let (hour, period): (u8, &str) = match time.hour() {
        0 => (12, "AM"),
        h @ 1..=11 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!("{hour:02}:{:02} {period}", time.minute())
}
