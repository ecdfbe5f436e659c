// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Time};

use crate::types::ReservationStatus;
use crate::wire::{format_date, format_time};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A working-hours boundary is outside `0..=23`.
    InvalidWorkingHour {
        /// Which boundary was invalid (`working_hours_start` or `working_hours_end`).
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
    /// The working window is empty or inverted.
    EmptyWorkingWindow {
        /// The configured opening hour.
        start: u8,
        /// The configured closing hour.
        end: u8,
    },
    /// Slot duration must be between 1 and 1440 minutes.
    InvalidSlotDuration(i64),
    /// An off day is not a weekday number in `0..=6`.
    InvalidOffDay(i64),
    /// The requested date falls on a configured off day.
    OffDay {
        /// The requested date.
        date: Date,
    },
    /// The requested slot starts before opening or ends after closing.
    OutsideWorkingHours {
        /// The requested start time.
        time: Time,
        /// The opening hour of the active policy.
        start_hour: u8,
        /// The closing hour of the active policy.
        end_hour: u8,
    },
    /// The requested time is inside the working window but not on a slot boundary.
    MisalignedSlot {
        /// The requested start time.
        time: Time,
        /// The slot length of the active policy.
        slot_duration_minutes: u32,
    },
    /// Service name is empty or too long.
    InvalidServiceName(String),
    /// Phone number is empty or too short.
    InvalidPhone(String),
    /// Unknown reservation status string.
    InvalidStatus(String),
    /// A reservation cannot move between these statuses.
    InvalidStatusTransition {
        /// The current status.
        from: ReservationStatus,
        /// The requested status.
        to: ReservationStatus,
    },
    /// Only notes may change once a reservation is cancelled or completed.
    TerminalReservation {
        /// The terminal status the reservation is in.
        status: ReservationStatus,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a time of day from string.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Year/month pair does not name a calendar month.
    InvalidCalendarMonth {
        /// The requested year.
        year: i32,
        /// The requested month number.
        month: u8,
    },
    /// Timezone name is not a known IANA zone.
    InvalidTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWorkingHour { field, value } => {
                write!(f, "Invalid {field}: {value}. Must be between 0 and 23")
            }
            Self::EmptyWorkingWindow { start, end } => {
                write!(
                    f,
                    "Working hours end ({end}) must be after working hours start ({start})"
                )
            }
            Self::InvalidSlotDuration(value) => {
                write!(
                    f,
                    "Invalid slot duration: {value}. Must be between 1 and 1440 minutes"
                )
            }
            Self::InvalidOffDay(value) => {
                write!(f, "Invalid off day: {value}. Must be between 0 (Monday) and 6 (Sunday)")
            }
            Self::OffDay { date } => {
                write!(
                    f,
                    "{} is an off day; no bookings are accepted",
                    format_date(*date)
                )
            }
            Self::OutsideWorkingHours {
                time,
                start_hour,
                end_hour,
            } => {
                write!(
                    f,
                    "{} is outside working hours ({start_hour:02}:00-{end_hour:02}:00)",
                    format_time(*time)
                )
            }
            Self::MisalignedSlot {
                time,
                slot_duration_minutes,
            } => {
                write!(
                    f,
                    "{} is not a valid slot start for {slot_duration_minutes}-minute slots",
                    format_time(*time)
                )
            }
            Self::InvalidServiceName(msg) => write!(f, "Invalid service name: {msg}"),
            Self::InvalidPhone(msg) => write!(f, "Invalid phone number: {msg}"),
            Self::InvalidStatus(status) => {
                write!(
                    f,
                    "Invalid status: '{status}'. Must be one of upcoming, cancelled, completed"
                )
            }
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Cannot change reservation status from {from} to {to}")
            }
            Self::TerminalReservation { status } => {
                write!(f, "Reservation is {status}; only notes can be changed")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::InvalidCalendarMonth { year, month } => {
                write!(f, "Invalid calendar month: {year}-{month}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
        }
    }
}

impl std::error::Error for DomainError {}
