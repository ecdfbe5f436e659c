// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Time};

use crate::error::DomainError;
use crate::slots::{is_slot_start, time_to_minutes};
use crate::types::PolicySettings;

const MAX_SERVICE_NAME_CHARS: usize = 100;
const MIN_PHONE_CHARS: usize = 8;

/// Validates that a requested `(date, time)` is a bookable slot under `policy`.
///
/// This function is pure and checks, in order:
/// - the date is not an off day
/// - the slot starts no earlier than opening and ends no later than closing
/// - the time is on a slot boundary
///
/// It does NOT check whether the slot is already taken; the ledger decides
/// that atomically at write time.
///
/// # Errors
///
/// Returns `OffDay`, `OutsideWorkingHours` or `MisalignedSlot`.
pub fn validate_requested_slot(
    policy: &PolicySettings,
    date: Date,
    time: Time,
) -> Result<(), DomainError> {
    if policy.is_off_day(date) {
        return Err(DomainError::OffDay { date });
    }

    let start: u32 = time_to_minutes(time);
    if start < policy.window_start_minute()
        || start + policy.slot_duration_minutes() > policy.window_end_minute()
    {
        return Err(DomainError::OutsideWorkingHours {
            time,
            start_hour: policy.working_hours_start(),
            end_hour: policy.working_hours_end(),
        });
    }

    if !is_slot_start(policy, time) {
        return Err(DomainError::MisalignedSlot {
            time,
            slot_duration_minutes: policy.slot_duration_minutes(),
        });
    }

    Ok(())
}

/// Validates and normalises a service name.
///
/// # Errors
///
/// Returns an error if the trimmed name is empty or longer than 100 characters.
pub fn validate_service_name(service_name: &str) -> Result<String, DomainError> {
    let trimmed: &str = service_name.trim();

    // Rule: service name must not be empty
    if trimmed.is_empty() {
        return Err(DomainError::InvalidServiceName(String::from(
            "Service name cannot be empty",
        )));
    }

    // Rule: service name is bounded
    if trimmed.chars().count() > MAX_SERVICE_NAME_CHARS {
        return Err(DomainError::InvalidServiceName(format!(
            "Service name cannot exceed {MAX_SERVICE_NAME_CHARS} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates and normalises a phone number used as an account key.
///
/// # Errors
///
/// Returns an error if the trimmed number is shorter than 8 characters.
pub fn validate_phone(phone: &str) -> Result<String, DomainError> {
    let trimmed: &str = phone.trim();
    if trimmed.chars().count() < MIN_PHONE_CHARS {
        return Err(DomainError::InvalidPhone(format!(
            "Phone number must be at least {MIN_PHONE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalises free-form notes: trimmed, and blank means no notes.
#[must_use]
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string)
}
