// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Slot generation for a single day.
//!
//! ## Invariants
//!
//! - Off days produce no slots and are tagged `is_off_day`
//! - Slots start at the opening hour and are exactly `slot_duration_minutes` long
//! - A trailing slot that would end after the closing hour is dropped, never truncated
//! - Slots are strictly chronological and unique by start time
//! - A slot is available iff its start time is not in the booked set
//!
//! Arithmetic is done in minutes since midnight so a window can never wrap
//! past midnight.

use std::collections::BTreeSet;
use time::{Date, Time};

use crate::types::PolicySettings;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A single bookable slot on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Slot start.
    pub start_time: Time,
    /// Slot end.
    pub end_time: Time,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// Whether the slot is free.
    pub available: bool,
}

/// The slot layout for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySlots {
    /// The date the slots were computed for.
    pub date: Date,
    /// Whether the date is an off day. Distinct from "every slot is booked".
    pub is_off_day: bool,
    /// Slots in chronological order.
    pub slots: Vec<SlotDescriptor>,
}

impl DaySlots {
    /// Returns only the free slots.
    pub fn available(&self) -> impl Iterator<Item = &SlotDescriptor> {
        self.slots.iter().filter(|slot| slot.available)
    }

    /// Counts the free slots.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available().count()
    }
}

/// Computes the slots for `date` under `policy`.
///
/// `booked_times` holds the start times of reservations that occupy a slot
/// on this date. Off days return an empty, `is_off_day` result regardless of
/// bookings.
#[must_use]
pub fn compute_available_slots(
    policy: &PolicySettings,
    date: Date,
    booked_times: &BTreeSet<Time>,
) -> DaySlots {
    if policy.is_off_day(date) {
        return DaySlots {
            date,
            is_off_day: true,
            slots: Vec::new(),
        };
    }

    let duration: u32 = policy.slot_duration_minutes();
    let slots: Vec<SlotDescriptor> = generate_slot_starts(
        policy.window_start_minute(),
        policy.window_end_minute(),
        duration,
    )
    .into_iter()
    .filter_map(|start| {
        let start_time: Time = minutes_to_time(start)?;
        let end_time: Time = minutes_to_time(start + duration)?;
        Some(SlotDescriptor {
            start_time,
            end_time,
            duration_minutes: duration,
            available: !booked_times.contains(&start_time),
        })
    })
    .collect();

    DaySlots {
        date,
        is_off_day: false,
        slots,
    }
}

/// Number of slots an open day has under `policy`.
#[must_use]
pub fn slots_per_day(policy: &PolicySettings) -> usize {
    generate_slot_starts(
        policy.window_start_minute(),
        policy.window_end_minute(),
        policy.slot_duration_minutes(),
    )
    .len()
}

/// Whether `time` is the start of a generated slot under `policy`.
///
/// Ignores off days; callers check those separately.
#[must_use]
pub fn is_slot_start(policy: &PolicySettings, time: Time) -> bool {
    if time.second() != 0 || time.nanosecond() != 0 {
        return false;
    }
    let minute: u32 = time_to_minutes(time);
    generate_slot_starts(
        policy.window_start_minute(),
        policy.window_end_minute(),
        policy.slot_duration_minutes(),
    )
    .contains(&minute)
}

/// Generates slot start minutes in `[start, end)` such that every slot fits.
///
/// A zero duration yields no slots.
fn generate_slot_starts(start: u32, end: u32, duration: u32) -> Vec<u32> {
    if duration == 0 {
        return Vec::new();
    }

    let end: u32 = end.min(MINUTES_PER_DAY);
    let mut starts: Vec<u32> = Vec::new();
    let mut cursor: u32 = start;
    while cursor + duration <= end {
        starts.push(cursor);
        cursor += duration;
    }
    starts
}

/// Minutes since midnight for a time of day (seconds are ignored).
pub fn time_to_minutes(time: Time) -> u32 {
    u32::from(time.hour()) * 60 + u32::from(time.minute())
}

/// Converts minutes since midnight to a time; `1440` maps to `00:00`.
fn minutes_to_time(minutes: u32) -> Option<Time> {
    let minutes: u32 = minutes % MINUTES_PER_DAY;
    let hour: u8 = u8::try_from(minutes / 60).ok()?;
    let minute: u8 = u8::try_from(minutes % 60).ok()?;
    Time::from_hms(hour, minute, 0).ok()
}
