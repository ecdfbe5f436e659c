// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates and times arrive as strings so that every accepted wire format is
//! normalised in one place before reaching the core. Required fields are
//! modelled as `Option` so that missing values become per-field validation
//! errors instead of opaque decode failures.

use reserva_domain::{
    BookingPolicy, CalendarDay, OwnerSummary, PolicyUpdate, SlotDescriptor, format_date,
    format_display_time, format_time,
};
use reserva_persistence::ReservationWithOwner;
use serde::{Deserialize, Deserializer, Serialize};

/// Default page size for admin listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Largest accepted page size for admin listings.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Distinguishes an absent field from an explicit `null`.
///
/// Absent deserializes to `None` (via `#[serde(default)]`), `null` to
/// `Some(None)`, and a value to `Some(Some(value))`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Booking settings
// ============================================================================

/// Booking settings as sent by an admin.
///
/// For creation every field except `off_days` is required; for updates every
/// field is optional and absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSettingsRequest {
    /// Opening hour (0-23).
    pub working_hours_start: Option<i64>,
    /// Closing hour (0-23), after the opening hour.
    pub working_hours_end: Option<i64>,
    /// Slot length in minutes.
    pub slot_duration_minutes: Option<i64>,
    /// Closed weekdays, Monday = 0 through Sunday = 6.
    pub off_days: Option<Vec<i64>>,
}

impl BookingSettingsRequest {
    /// Converts this request to a partial policy update.
    #[must_use]
    pub fn to_update(&self) -> PolicyUpdate {
        PolicyUpdate {
            working_hours_start: self.working_hours_start,
            working_hours_end: self.working_hours_end,
            slot_duration_minutes: self.slot_duration_minutes,
            off_days: self.off_days.clone(),
        }
    }
}

/// The active booking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSettingsResponse {
    /// The policy identifier.
    pub id: i64,
    /// Opening hour.
    pub working_hours_start: u8,
    /// Closing hour.
    pub working_hours_end: u8,
    /// Slot length in minutes.
    pub slot_duration_minutes: u32,
    /// Closed weekdays, ascending.
    pub off_days: Vec<u8>,
    /// Always `true` for the active policy.
    pub is_active: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&BookingPolicy> for BookingSettingsResponse {
    fn from(policy: &BookingPolicy) -> Self {
        Self {
            id: policy.policy_id,
            working_hours_start: policy.settings.working_hours_start(),
            working_hours_end: policy.settings.working_hours_end(),
            slot_duration_minutes: policy.settings.slot_duration_minutes(),
            off_days: policy.settings.off_days().iter().copied().collect(),
            is_active: policy.is_active,
            created_at: policy.created_at.clone(),
            updated_at: policy.updated_at.clone(),
        }
    }
}

/// The working window as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Opening time.
    pub start: String,
    /// Closing time.
    pub end: String,
}

impl From<&BookingPolicy> for WorkingHours {
    fn from(policy: &BookingPolicy) -> Self {
        Self {
            start: format!("{:02}:00", policy.settings.working_hours_start()),
            end: format!("{:02}:00", policy.settings.working_hours_end()),
        }
    }
}

// ============================================================================
// Availability
// ============================================================================

/// Query for the slots of one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlotsQuery {
    /// The date, in any accepted wire format.
    pub date: Option<String>,
    /// The service being booked; echoed back.
    pub service: Option<String>,
    /// Also list reserved slots (with `available: false`).
    pub include_reserved: Option<bool>,
}

/// One slot in an availability response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Start time (`HH:MM`).
    pub time: String,
    /// Start time (`hh:mm AM/PM`).
    pub display_time: String,
    /// End time (`HH:MM`).
    pub end_time: String,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// Whether the slot is free.
    pub available: bool,
}

impl From<&SlotDescriptor> for SlotInfo {
    fn from(slot: &SlotDescriptor) -> Self {
        Self {
            time: format_time(slot.start_time),
            display_time: format_display_time(slot.start_time),
            end_time: format_time(slot.end_time),
            duration_minutes: slot.duration_minutes,
            available: slot.available,
        }
    }
}

/// Slots for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    /// The date (`YYYY-MM-DD`).
    pub date: String,
    /// The requested service, echoed.
    pub service: Option<String>,
    /// Whether the date is an off day.
    pub is_off_day: bool,
    /// The working window.
    pub working_hours: WorkingHours,
    /// Slot length in minutes.
    pub duration_minutes: u32,
    /// Number of free slots.
    pub total_available_slots: usize,
    /// The slots, chronologically.
    pub available_slots: Vec<SlotInfo>,
}

/// Query for a month calendar. Absent fields default to the current month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarQuery {
    /// The year.
    pub year: Option<i32>,
    /// The month number (1-12).
    pub month: Option<u8>,
}

/// One day of a month calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDayInfo {
    /// The date (`YYYY-MM-DD`).
    pub date: String,
    /// Day of month.
    pub day: u8,
    /// English weekday name.
    pub day_name: String,
    /// Whether the policy closes on this weekday.
    pub is_off_day: bool,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Whether this is today in the business timezone.
    pub is_today: bool,
    /// Reservations holding a slot.
    pub reserved_count: u32,
    /// Slots still open.
    pub available_count: u32,
}

impl From<&CalendarDay> for CalendarDayInfo {
    fn from(day: &CalendarDay) -> Self {
        Self {
            date: format_date(day.date),
            day: day.day(),
            day_name: day.day_name(),
            is_off_day: day.is_off_day,
            is_weekend: day.is_weekend,
            is_today: day.is_today,
            reserved_count: day.reserved_count,
            available_count: day.available_count,
        }
    }
}

/// A month calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarResponse {
    /// The year.
    pub year: i32,
    /// The month number.
    pub month: u8,
    /// The working window.
    pub working_hours: WorkingHours,
    /// Closed weekdays.
    pub off_days: Vec<u8>,
    /// One entry per day of the month.
    pub days: Vec<CalendarDayInfo>,
}

// ============================================================================
// Reservations
// ============================================================================

/// An owner summary as rendered in snapshots.
///
/// Absent profile fields render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    /// The user ID.
    pub id: i64,
    /// Phone number.
    pub phone: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Account creation timestamp.
    pub date_joined: String,
    /// Gender.
    pub gender: String,
    /// Country.
    pub country: String,
}

impl From<&OwnerSummary> for UserDetails {
    fn from(owner: &OwnerSummary) -> Self {
        Self {
            id: owner.user_id,
            phone: owner.phone.clone(),
            first_name: owner.first_name.clone(),
            last_name: owner.last_name.clone(),
            email: owner.email.clone(),
            is_active: owner.is_active,
            date_joined: owner.date_joined.clone(),
            gender: owner.gender.clone().unwrap_or_default(),
            country: owner.country.clone().unwrap_or_default(),
        }
    }
}

/// A reservation with its owner, as returned by the API and published to
/// live dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    /// The reservation ID.
    pub id: i64,
    /// The owner's user ID.
    pub user_id: i64,
    /// The booked service.
    pub service_name: String,
    /// Booking date (`YYYY-MM-DD`).
    pub booking_date: String,
    /// Start time (`HH:MM`).
    pub booking_time: String,
    /// Start time (`hh:mm AM/PM`).
    pub display_time: String,
    /// End time (`HH:MM`).
    pub end_time: String,
    /// Length in minutes.
    pub duration_minutes: u32,
    /// `upcoming`, `cancelled`, or `completed`.
    pub status: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// The owner.
    pub user_details: UserDetails,
}

impl From<&ReservationWithOwner> for BookingSnapshot {
    fn from(record: &ReservationWithOwner) -> Self {
        let reservation = &record.reservation;
        Self {
            id: reservation.reservation_id,
            user_id: reservation.owner_id,
            service_name: reservation.service_name.clone(),
            booking_date: format_date(reservation.date),
            booking_time: format_time(reservation.time),
            display_time: format_display_time(reservation.time),
            end_time: format_time(reservation.end_time()),
            duration_minutes: reservation.duration_minutes,
            status: reservation.status.as_str().to_string(),
            notes: reservation.notes.clone(),
            created_at: reservation.created_at.clone(),
            updated_at: reservation.updated_at.clone(),
            user_details: UserDetails::from(&record.owner),
        }
    }
}

/// A customer's booking request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    /// The service to book.
    pub service_name: Option<String>,
    /// The date, in any accepted wire format.
    #[serde(alias = "booking_date")]
    pub date: Option<String>,
    /// The start time, in any accepted wire format.
    #[serde(alias = "booking_time")]
    pub time: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// An admin booking on behalf of an existing user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCreateReservationRequest {
    /// The owner.
    pub user_id: Option<i64>,
    /// The booking details.
    #[serde(flatten)]
    pub booking: CreateReservationRequest,
}

/// A partial reservation update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    /// New service name.
    pub service_name: Option<String>,
    /// New date.
    #[serde(alias = "booking_date")]
    pub date: Option<String>,
    /// New start time.
    #[serde(alias = "booking_time")]
    pub time: Option<String>,
    /// New status.
    pub status: Option<String>,
    /// New notes; `null` clears them.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

/// An admin status change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// The new status.
    pub status: Option<String>,
}

/// A booking made by an agent for a customer identified by phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBookingRequest {
    /// The customer's phone number.
    pub phone: Option<String>,
    /// The service to book.
    pub service_name: Option<String>,
    /// The date, in any accepted wire format.
    pub booking_date: Option<String>,
    /// The start time, in any accepted wire format.
    pub booking_time: Option<String>,
    /// Used only if the customer is new.
    pub first_name: Option<String>,
    /// Used only if the customer is new.
    pub last_name: Option<String>,
    /// Used only if the customer is new.
    pub email: Option<String>,
    /// Used only if the customer is new.
    pub gender: Option<String>,
    /// Used only if the customer is new.
    pub country: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// The result of an agent booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBookingResponse {
    /// Whether the customer account was created by this call.
    pub user_created: bool,
    /// The customer.
    pub user: UserDetails,
    /// The new reservation.
    pub booking: BookingSnapshot,
}

/// Confirmation of a hard delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReservationResponse {
    /// The deleted reservation ID.
    pub id: i64,
    /// A success message.
    pub message: String,
}

/// A caller's own reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationListResponse {
    /// The reservations, newest booking first.
    pub reservations: Vec<BookingSnapshot>,
    /// How many were returned.
    pub count: usize,
}

/// Filters for the admin listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReservationsQuery {
    /// Exact booking date.
    pub date: Option<String>,
    /// Service name substring.
    pub service: Option<String>,
    /// Exact status.
    pub status: Option<String>,
    /// Exact owner.
    pub user_id: Option<i64>,
    /// Owner phone substring.
    pub phone: Option<String>,
    /// Page size (default 50, max 200).
    pub limit: Option<i64>,
    /// Records to skip.
    pub offset: Option<i64>,
}

/// Paging information for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Records matching the filter.
    pub total_count: i64,
    /// Page size used.
    pub limit: i64,
    /// Records skipped.
    pub offset: i64,
    /// Whether more records follow this page.
    pub has_more: bool,
}

/// One page of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingListResponse {
    /// The records on this page.
    pub bookings: Vec<BookingSnapshot>,
    /// Paging information.
    pub pagination: Pagination,
}
