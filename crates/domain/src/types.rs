// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::{Date, Duration, Time};

/// Opening hour used when no policy has ever been activated.
pub const DEFAULT_WORKING_HOURS_START: u8 = 9;
/// Closing hour used when no policy has ever been activated.
pub const DEFAULT_WORKING_HOURS_END: u8 = 17;
/// Slot length used when no policy has ever been activated.
pub const DEFAULT_SLOT_DURATION_MINUTES: u32 = 60;

const MAX_SLOT_DURATION_MINUTES: i64 = 24 * 60;

/// Validated booking-policy parameters.
///
/// Construction through [`PolicySettings::new`] guarantees:
/// - both working-hour boundaries are in `0..=23`
/// - the window is non-empty (`start < end`)
/// - the slot duration is in `1..=1440` minutes
/// - every off day is a weekday number in `0..=6` (Monday = 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySettings {
    working_hours_start: u8,
    working_hours_end: u8,
    slot_duration_minutes: u32,
    off_days: BTreeSet<u8>,
}

impl PolicySettings {
    /// Creates validated policy settings.
    ///
    /// Duplicate off days collapse into one.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of range or the working
    /// window is empty.
    pub fn new(
        working_hours_start: i64,
        working_hours_end: i64,
        slot_duration_minutes: i64,
        off_days: &[i64],
    ) -> Result<Self, DomainError> {
        let start: u8 = parse_hour("working_hours_start", working_hours_start)?;
        let end: u8 = parse_hour("working_hours_end", working_hours_end)?;

        if start >= end {
            return Err(DomainError::EmptyWorkingWindow { start, end });
        }

        if !(1..=MAX_SLOT_DURATION_MINUTES).contains(&slot_duration_minutes) {
            return Err(DomainError::InvalidSlotDuration(slot_duration_minutes));
        }
        let duration: u32 = u32::try_from(slot_duration_minutes)
            .map_err(|_| DomainError::InvalidSlotDuration(slot_duration_minutes))?;

        let mut days: BTreeSet<u8> = BTreeSet::new();
        for &day in off_days {
            let weekday: u8 = u8::try_from(day)
                .ok()
                .filter(|d| *d <= 6)
                .ok_or(DomainError::InvalidOffDay(day))?;
            days.insert(weekday);
        }

        Ok(Self {
            working_hours_start: start,
            working_hours_end: end,
            slot_duration_minutes: duration,
            off_days: days,
        })
    }

    /// Returns the opening hour.
    #[must_use]
    pub const fn working_hours_start(&self) -> u8 {
        self.working_hours_start
    }

    /// Returns the closing hour.
    #[must_use]
    pub const fn working_hours_end(&self) -> u8 {
        self.working_hours_end
    }

    /// Returns the slot length in minutes.
    #[must_use]
    pub const fn slot_duration_minutes(&self) -> u32 {
        self.slot_duration_minutes
    }

    /// Returns the off days (Monday = 0).
    #[must_use]
    pub const fn off_days(&self) -> &BTreeSet<u8> {
        &self.off_days
    }

    /// Whether `date` falls on one of the configured off days.
    #[must_use]
    pub fn is_off_day(&self, date: Date) -> bool {
        self.off_days
            .contains(&date.weekday().number_days_from_monday())
    }

    /// Minutes since midnight at which the working window opens.
    #[must_use]
    pub fn window_start_minute(&self) -> u32 {
        u32::from(self.working_hours_start) * 60
    }

    /// Minutes since midnight at which the working window closes.
    #[must_use]
    pub fn window_end_minute(&self) -> u32 {
        u32::from(self.working_hours_end) * 60
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            working_hours_start: DEFAULT_WORKING_HOURS_START,
            working_hours_end: DEFAULT_WORKING_HOURS_END,
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            off_days: BTreeSet::new(),
        }
    }
}

fn parse_hour(field: &'static str, value: i64) -> Result<u8, DomainError> {
    u8::try_from(value)
        .ok()
        .filter(|h| *h <= 23)
        .ok_or(DomainError::InvalidWorkingHour { field, value })
}

/// A partial change to the active policy.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyUpdate {
    /// New opening hour.
    pub working_hours_start: Option<i64>,
    /// New closing hour.
    pub working_hours_end: Option<i64>,
    /// New slot length in minutes.
    pub slot_duration_minutes: Option<i64>,
    /// Replacement off-day set.
    pub off_days: Option<Vec<i64>>,
}

impl PolicyUpdate {
    /// Applies the present fields on top of `current` and re-validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings are invalid.
    pub fn apply_to(&self, current: &PolicySettings) -> Result<PolicySettings, DomainError> {
        let off_days: Vec<i64> = self.off_days.clone().unwrap_or_else(|| {
            current
                .off_days()
                .iter()
                .map(|d| i64::from(*d))
                .collect()
        });

        PolicySettings::new(
            self.working_hours_start
                .unwrap_or_else(|| i64::from(current.working_hours_start())),
            self.working_hours_end
                .unwrap_or_else(|| i64::from(current.working_hours_end())),
            self.slot_duration_minutes
                .unwrap_or_else(|| i64::from(current.slot_duration_minutes())),
            &off_days,
        )
    }

    /// Whether this update carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.working_hours_start.is_none()
            && self.working_hours_end.is_none()
            && self.slot_duration_minutes.is_none()
            && self.off_days.is_none()
    }
}

/// A persisted booking policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPolicy {
    /// The canonical numeric identifier assigned by the database.
    pub policy_id: i64,
    /// The validated policy parameters.
    pub settings: PolicySettings,
    /// Whether this is the single active policy.
    pub is_active: bool,
    /// Creation timestamp (RFC 3339, UTC).
    pub created_at: String,
    /// Last modification timestamp (RFC 3339, UTC).
    pub updated_at: String,
}

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Booked and not yet held. Occupies its slot.
    #[default]
    Upcoming,
    /// Cancelled by the owner or an admin. Frees its slot.
    Cancelled,
    /// Held. Continues to occupy its slot.
    Completed,
}

impl ReservationStatus {
    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `upcoming` → `cancelled`
    /// - `upcoming` → `completed`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Upcoming, Self::Cancelled | Self::Completed)
        )
    }

    /// Whether no further status transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Whether a reservation in this status blocks its `(date, time)` slot.
    #[must_use]
    pub const fn occupies_slot(&self) -> bool {
        matches!(self, Self::Upcoming | Self::Completed)
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booking record held by the reservation ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// The canonical numeric identifier assigned by the database.
    pub reservation_id: i64,
    /// The owning user (weak link into the user directory).
    pub owner_id: i64,
    /// The booked service.
    pub service_name: String,
    /// The booked date.
    pub date: Date,
    /// The slot start time.
    pub time: Time,
    /// Slot length at the time of booking.
    pub duration_minutes: u32,
    /// Current lifecycle status.
    pub status: ReservationStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp (RFC 3339, UTC).
    pub created_at: String,
    /// Last modification timestamp (RFC 3339, UTC).
    pub updated_at: String,
}

impl Reservation {
    /// Returns the time the booked slot ends.
    #[must_use]
    pub fn end_time(&self) -> Time {
        self.time + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// A validated reservation that has not been written to the ledger yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// The owning user.
    pub owner_id: i64,
    /// The booked service (trimmed).
    pub service_name: String,
    /// The booked date.
    pub date: Date,
    /// The slot start time.
    pub time: Time,
    /// Slot length taken from the active policy.
    pub duration_minutes: u32,
    /// Free-form notes (trimmed, `None` when blank).
    pub notes: Option<String>,
}

/// A validated set of column changes for an existing reservation.
///
/// `None` means "leave unchanged". For `notes`, `Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationChanges {
    /// New service name.
    pub service_name: Option<String>,
    /// New date.
    pub date: Option<Date>,
    /// New slot start time.
    pub time: Option<Time>,
    /// New slot length (set whenever the slot moves).
    pub duration_minutes: Option<u32>,
    /// New status.
    pub status: Option<ReservationStatus>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

impl ReservationChanges {
    /// Whether applying these changes would modify nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.service_name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.duration_minutes.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

/// Denormalized owner data attached to reservation snapshots.
///
/// `gender` and `country` are optional profile fields; consumers decide
/// how absence is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    /// The user's canonical ID.
    pub user_id: i64,
    /// The phone number the account was registered with.
    pub phone: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address (may be empty).
    pub email: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Account creation timestamp (RFC 3339, UTC).
    pub date_joined: String,
    /// Optional gender.
    pub gender: Option<String>,
    /// Optional country.
    pub country: Option<String>,
}

/// Profile fields supplied when an account is created on first booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerProfile {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// Which reservations a caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Every reservation is visible.
    Admin,
    /// Only reservations owned by this user are visible.
    Owner(i64),
}

impl OwnerScope {
    /// Whether a reservation owned by `owner_id` is visible in this scope.
    #[must_use]
    pub const fn permits(&self, owner_id: i64) -> bool {
        match self {
            Self::Admin => true,
            Self::Owner(id) => *id == owner_id,
        }
    }

    /// Whether this is the unrestricted admin scope.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// The kind of ledger mutation a booking notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingEventKind {
    /// A reservation was created.
    Created,
    /// A reservation was modified, status-changed, or cancelled.
    Updated,
    /// A reservation was removed from the ledger.
    Deleted,
}

impl BookingEventKind {
    /// Converts this kind to its live-channel message type.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::Created => "booking_created",
            Self::Updated => "booking_updated",
            Self::Deleted => "booking_deleted",
        }
    }
}
