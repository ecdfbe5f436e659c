// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking rules for Reserva.
//!
//! This crate is pure: it validates policies, lays out the slots of a day,
//! builds month calendars, and normalises wire dates and times. It never
//! touches storage, and it never decides whether a slot is already taken.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod error;
mod slots;
mod types;
mod validation;
mod wire;

#[cfg(test)]
mod tests;

pub use calendar::{CalendarDay, compute_month_calendar, parse_timezone, today_in};
pub use error::DomainError;
pub use slots::{DaySlots, SlotDescriptor, compute_available_slots, is_slot_start, slots_per_day};

// Re-export public types
pub use types::{
    BookingEventKind, BookingPolicy, DEFAULT_SLOT_DURATION_MINUTES, DEFAULT_WORKING_HOURS_END,
    DEFAULT_WORKING_HOURS_START, NewReservation, OwnerProfile, OwnerScope, OwnerSummary,
    PolicySettings, PolicyUpdate, Reservation, ReservationChanges, ReservationStatus,
};
pub use validation::{
    normalize_notes, validate_phone, validate_requested_slot, validate_service_name,
};
pub use wire::{
    format_date, format_display_date, format_display_time, format_time, parse_wire_date,
    parse_wire_time,
};
