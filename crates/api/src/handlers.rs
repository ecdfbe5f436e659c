// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for booking operations.
//!
//! Every ledger mutation follows the same path:
//!
//! 1. Authorize the caller and normalise the request
//! 2. Read the active policy (never cached across calls)
//! 3. Plan the write with the pure core `apply`
//! 4. Persist it; the storage constraint arbitrates slot conflicts
//! 5. Publish the result, best effort, after the write has committed

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use reserva::{Command, ReservationPatch, Transition, apply};
use reserva_domain::{
    BookingPolicy, CalendarDay, DaySlots, DomainError, OwnerProfile, OwnerScope, OwnerSummary,
    PolicySettings, PolicyUpdate, Reservation, ReservationStatus, compute_available_slots,
    compute_month_calendar, format_date, parse_wire_date, parse_wire_time, validate_phone,
    validate_requested_slot, validate_service_name,
};
use reserva_persistence::{
    PersistedTransition, Persistence, ReservationFilter, ReservationPage, ReservationWithOwner,
};
use time::{Date, Month, Time};
use tracing::info;

use crate::auth::{AuthenticatedCaller, AuthorizationService};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::notify::{BookingEvent, NotificationBus, publish_best_effort};
use crate::request_response::{
    AdminCreateReservationRequest, AgentBookingRequest, AgentBookingResponse,
    AvailableSlotsQuery, AvailableSlotsResponse, BookingListResponse, BookingSettingsRequest,
    BookingSettingsResponse, BookingSnapshot, CalendarDayInfo, CalendarQuery, CalendarResponse,
    CreateReservationRequest, DEFAULT_LIST_LIMIT, DeleteReservationResponse,
    ListReservationsQuery, MAX_LIST_LIMIT, Pagination, ReservationListResponse, SlotInfo,
    StatusUpdateRequest, UpdateReservationRequest, UserDetails, WorkingHours,
};

const REQUIRED: &str = "This field is required";

/// Collects per-field validation messages across a whole request.
#[derive(Default)]
struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn required<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        let value: Option<&str> = value.map(str::trim).filter(|v| !v.is_empty());
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    fn required_number(&mut self, field: &str, value: Option<i64>) -> Option<i64> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    fn date(&mut self, field: &str, value: Option<&str>) -> Option<Date> {
        match parse_wire_date(value?) {
            Ok(date) => Some(date),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    fn time(&mut self, field: &str, value: Option<&str>) -> Option<Time> {
        match parse_wire_time(value?) {
            Ok(time) => Some(time),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    fn status(&mut self, value: Option<&str>) -> Option<ReservationStatus> {
        match ReservationStatus::from_str(value?) {
            Ok(status) => Some(status),
            Err(e) => {
                self.add("status", e.to_string());
                None
            }
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError { fields: self.0 })
        }
    }
}

/// A normalised booking request.
struct BookingInput {
    service_name: String,
    date: Date,
    time: Time,
    notes: Option<String>,
}

fn parse_booking(
    errors: &mut FieldErrors,
    service_name: Option<&str>,
    date: Option<&str>,
    time: Option<&str>,
    notes: Option<&str>,
) -> Option<BookingInput> {
    let service_name: Option<&str> = errors.required("service_name", service_name);
    let date: Option<&str> = errors.required("date", date);
    let time: Option<&str> = errors.required("time", time);
    let date: Option<Date> = errors.date("date", date);
    let time: Option<Time> = errors.time("time", time);

    Some(BookingInput {
        service_name: service_name?.to_string(),
        date: date?,
        time: time?,
        notes: notes.map(str::to_string),
    })
}

fn parse_create_request(request: &CreateReservationRequest) -> Result<BookingInput, ApiError> {
    let mut errors: FieldErrors = FieldErrors::default();
    let input: Option<BookingInput> = parse_booking(
        &mut errors,
        request.service_name.as_deref(),
        request.date.as_deref(),
        request.time.as_deref(),
        request.notes.as_deref(),
    );
    errors.finish()?;
    input.ok_or_else(|| ApiError::invalid("body", "Incomplete booking request"))
}

/// Plans, persists, and publishes one ledger command.
///
/// The policy is read inside the call so a concurrent settings change is
/// seen by the next booking, never a stale copy.
fn run_command(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    scope: OwnerScope,
    current: Option<&Reservation>,
    command: Command,
) -> Result<BookingSnapshot, ApiError> {
    let policy: BookingPolicy = persistence.active_policy_or_default()?;
    let transition: Transition =
        apply(&policy.settings, current, scope, command).map_err(translate_core_error)?;
    let persisted: PersistedTransition = persistence.persist_transition(&transition)?;
    Ok(publish_committed(bus, &persisted))
}

/// Snapshots a committed write and publishes its event, if it has one.
fn publish_committed(
    bus: &dyn NotificationBus,
    persisted: &PersistedTransition,
) -> BookingSnapshot {
    let snapshot: BookingSnapshot = BookingSnapshot::from(&persisted.record);
    if let Some(kind) = persisted.event {
        publish_best_effort(bus, &BookingEvent::new(kind, snapshot.clone()));
    }
    snapshot
}

// ============================================================================
// Booking settings
// ============================================================================

/// Returns the active booking settings, activating the defaults on first use.
///
/// # Errors
///
/// Returns an error if the policy cannot be read or seeded.
pub fn get_booking_settings(
    persistence: &mut Persistence,
) -> Result<BookingSettingsResponse, ApiError> {
    let policy: BookingPolicy = persistence.active_policy_or_default()?;
    Ok(BookingSettingsResponse::from(&policy))
}

/// Replaces the active booking settings with a new policy.
///
/// The previous policy is deactivated atomically.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `caller` - The authenticated caller
/// * `request` - The new settings; all but `off_days` are required
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not an admin
/// - A field is missing or invalid
pub fn create_booking_settings(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
    request: &BookingSettingsRequest,
) -> Result<BookingSettingsResponse, ApiError> {
    AuthorizationService::authorize_manage_settings(caller)?;

    let mut errors: FieldErrors = FieldErrors::default();
    let start: Option<i64> = errors.required_number("working_hours_start", request.working_hours_start);
    let end: Option<i64> = errors.required_number("working_hours_end", request.working_hours_end);
    let duration: Option<i64> =
        errors.required_number("slot_duration_minutes", request.slot_duration_minutes);
    errors.finish()?;

    let (Some(start), Some(end), Some(duration)) = (start, end, duration) else {
        return Err(ApiError::invalid("body", "Incomplete settings request"));
    };
    let off_days: Vec<i64> = request.off_days.clone().unwrap_or_default();

    let settings: PolicySettings =
        PolicySettings::new(start, end, duration, &off_days).map_err(translate_domain_error)?;
    let policy: BookingPolicy = persistence.activate_policy(&settings)?;

    info!(
        user_id = caller.user_id,
        policy_id = policy.policy_id,
        "Booking settings replaced"
    );
    Ok(BookingSettingsResponse::from(&policy))
}

/// Applies a partial change to the active booking settings.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not an admin
/// - The request carries no fields
/// - The merged settings are invalid
pub fn update_booking_settings(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
    request: &BookingSettingsRequest,
) -> Result<BookingSettingsResponse, ApiError> {
    AuthorizationService::authorize_manage_settings(caller)?;

    let update: PolicyUpdate = request.to_update();
    if update.is_empty() {
        return Err(ApiError::invalid(
            "settings",
            "At least one setting must be provided",
        ));
    }

    let current: BookingPolicy = persistence.active_policy_or_default()?;
    let settings: PolicySettings = update
        .apply_to(&current.settings)
        .map_err(translate_domain_error)?;
    let policy: BookingPolicy = persistence.update_policy(current.policy_id, &settings)?;

    info!(
        user_id = caller.user_id,
        policy_id = policy.policy_id,
        "Booking settings updated"
    );
    Ok(BookingSettingsResponse::from(&policy))
}

// ============================================================================
// Availability
// ============================================================================

/// Computes the slots for one date under the active policy.
///
/// By default only free slots are listed; with `include_reserved` the held
/// slots are included with `available: false`.
///
/// # Errors
///
/// Returns an error if the date is missing or malformed.
pub fn get_available_slots(
    persistence: &mut Persistence,
    query: &AvailableSlotsQuery,
) -> Result<AvailableSlotsResponse, ApiError> {
    let mut errors: FieldErrors = FieldErrors::default();
    let date: Option<&str> = errors.required("date", query.date.as_deref());
    let date: Option<Date> = errors.date("date", date);
    errors.finish()?;
    let date: Date = date.ok_or_else(|| ApiError::invalid("date", REQUIRED))?;

    let policy: BookingPolicy = persistence.active_policy_or_default()?;
    let booked: BTreeSet<Time> = persistence.booked_times_on(date)?;
    let day: DaySlots = compute_available_slots(&policy.settings, date, &booked);

    let include_reserved: bool = query.include_reserved.unwrap_or(false);
    let slots: Vec<SlotInfo> = day
        .slots
        .iter()
        .filter(|slot| include_reserved || slot.available)
        .map(SlotInfo::from)
        .collect();

    Ok(AvailableSlotsResponse {
        date: format_date(date),
        service: query.service.clone(),
        is_off_day: day.is_off_day,
        working_hours: WorkingHours::from(&policy),
        duration_minutes: policy.settings.slot_duration_minutes(),
        total_available_slots: day.available_count(),
        available_slots: slots,
    })
}

/// Builds the month calendar with per-day reservation counts.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `query` - The month; absent fields default to the month of `today`
/// * `today` - The current date in the business timezone
///
/// # Errors
///
/// Returns an error if the year/month pair is invalid.
pub fn get_booking_calendar(
    persistence: &mut Persistence,
    query: &CalendarQuery,
    today: Date,
) -> Result<CalendarResponse, ApiError> {
    let year: i32 = query.year.unwrap_or_else(|| today.year());
    let month: u8 = query.month.unwrap_or_else(|| u8::from(today.month()));

    let first: Date = Month::try_from(month)
        .ok()
        .and_then(|m| Date::from_calendar_date(year, m, 1).ok())
        .ok_or_else(|| translate_domain_error(DomainError::InvalidCalendarMonth { year, month }))?;
    let last: Date = Date::from_calendar_date(year, first.month(), first.month().length(year))
        .map_err(|_| translate_domain_error(DomainError::InvalidCalendarMonth { year, month }))?;

    let policy: BookingPolicy = persistence.active_policy_or_default()?;
    let booked: BTreeMap<Date, BTreeSet<Time>> = persistence.booked_times_between(first, last)?;
    let days: Vec<CalendarDay> = compute_month_calendar(&policy.settings, year, month, &booked, today)
        .map_err(translate_domain_error)?;

    Ok(CalendarResponse {
        year,
        month,
        working_hours: WorkingHours::from(&policy),
        off_days: policy.settings.off_days().iter().copied().collect(),
        days: days.iter().map(CalendarDayInfo::from).collect(),
    })
}

// ============================================================================
// Customer reservations
// ============================================================================

/// Books a slot for the calling user.
///
/// # Errors
///
/// Returns an error if:
/// - A field is missing or malformed
/// - The slot is on an off day, outside working hours, or misaligned
/// - The slot is already held (`SlotTaken`)
pub fn create_reservation(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    request: &CreateReservationRequest,
) -> Result<BookingSnapshot, ApiError> {
    info!(user_id = caller.user_id, "Handling create_reservation request");

    let input: BookingInput = parse_create_request(request)?;
    let snapshot: BookingSnapshot = run_command(
        persistence,
        bus,
        caller.scope(),
        None,
        Command::CreateReservation {
            owner_id: caller.user_id,
            service_name: input.service_name,
            date: input.date,
            time: input.time,
            notes: input.notes,
        },
    )?;

    info!(reservation_id = snapshot.id, "Reservation created");
    Ok(snapshot)
}

/// Lists the calling user's reservations, newest booking first.
///
/// # Errors
///
/// Returns an error if the ledger cannot be read.
pub fn list_own_reservations(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
) -> Result<ReservationListResponse, ApiError> {
    let filter: ReservationFilter = ReservationFilter {
        owner_id: Some(caller.user_id),
        ..ReservationFilter::default()
    };
    let page: ReservationPage = persistence.list_reservations(&filter, i64::MAX, 0)?;

    let reservations: Vec<BookingSnapshot> =
        page.records.iter().map(BookingSnapshot::from).collect();
    Ok(ReservationListResponse {
        count: reservations.len(),
        reservations,
    })
}

/// Returns one reservation visible to the caller.
///
/// # Errors
///
/// Returns `NotFound` if the reservation does not exist or belongs to
/// someone else.
pub fn get_reservation(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
) -> Result<BookingSnapshot, ApiError> {
    persistence
        .get_reservation_with_owner(reservation_id)?
        .filter(|record| caller.scope().permits(record.reservation.owner_id))
        .map(|record| BookingSnapshot::from(&record))
        .ok_or_else(|| ApiError::reservation_not_found(reservation_id))
}

/// Applies a partial update to a reservation visible to the caller.
///
/// A patch that restates the current values changes nothing and publishes
/// nothing.
///
/// # Errors
///
/// Returns an error if:
/// - The reservation is not visible to the caller
/// - A field is malformed
/// - The status change or edit is not allowed
/// - The new slot is invalid or already held
/// - The reservation changed after it was read (`Conflict`)
pub fn update_reservation(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
    request: &UpdateReservationRequest,
) -> Result<BookingSnapshot, ApiError> {
    info!(
        user_id = caller.user_id,
        reservation_id, "Handling update_reservation request"
    );

    let mut errors: FieldErrors = FieldErrors::default();
    let date: Option<Date> = errors.date("date", request.date.as_deref());
    let time: Option<Time> = errors.time("time", request.time.as_deref());
    let status: Option<ReservationStatus> = errors.status(request.status.as_deref());
    errors.finish()?;

    let patch: ReservationPatch = ReservationPatch {
        service_name: request.service_name.clone(),
        date,
        time,
        status,
        notes: request.notes.clone(),
    };

    let current: Option<Reservation> = persistence.get_reservation(reservation_id)?;
    run_command(
        persistence,
        bus,
        caller.scope(),
        current.as_ref(),
        Command::UpdateReservation {
            reservation_id,
            patch,
        },
    )
}

/// Cancels a reservation visible to the caller.
///
/// Cancelling an already-cancelled reservation returns it unchanged.
///
/// # Errors
///
/// Returns an error if the reservation is not visible to the caller, is
/// already completed, or changed after it was read (`Conflict`).
pub fn cancel_reservation(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
) -> Result<BookingSnapshot, ApiError> {
    info!(
        user_id = caller.user_id,
        reservation_id, "Handling cancel_reservation request"
    );

    let current: Option<Reservation> = persistence.get_reservation(reservation_id)?;
    run_command(
        persistence,
        bus,
        caller.scope(),
        current.as_ref(),
        Command::CancelReservation { reservation_id },
    )
}

// ============================================================================
// Agent bookings
// ============================================================================

/// Books on behalf of a customer identified by phone number.
///
/// The customer account is created on first use. Every field and the slot
/// itself are validated before any account is created, and a new account is
/// written in the same transaction as the booking, so it is rolled back if
/// the slot turns out to be held.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is neither an agent nor an admin
/// - A field is missing or malformed
/// - The slot is invalid or already held
pub fn agent_create_booking(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    request: &AgentBookingRequest,
) -> Result<AgentBookingResponse, ApiError> {
    AuthorizationService::authorize_agent_booking(caller)?;
    info!(user_id = caller.user_id, "Handling agent booking request");

    let mut errors: FieldErrors = FieldErrors::default();
    let phone: Option<&str> = errors.required("phone", request.phone.as_deref());
    let phone: Option<String> = phone.and_then(|p| match validate_phone(p) {
        Ok(phone) => Some(phone),
        Err(e) => {
            errors.add("phone", e.to_string());
            None
        }
    });
    let input: Option<BookingInput> = parse_booking(
        &mut errors,
        request.service_name.as_deref(),
        request.booking_date.as_deref(),
        request.booking_time.as_deref(),
        request.notes.as_deref(),
    );
    errors.finish()?;
    let (Some(phone), Some(input)) = (phone, input) else {
        return Err(ApiError::invalid("body", "Incomplete booking request"));
    };

    let policy: BookingPolicy = persistence.active_policy_or_default()?;
    validate_service_name(&input.service_name).map_err(translate_domain_error)?;
    validate_requested_slot(&policy.settings, input.date, input.time)
        .map_err(translate_domain_error)?;

    let profile: OwnerProfile = OwnerProfile {
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        email: request.email.clone(),
        gender: request.gender.clone(),
        country: request.country.clone(),
    };

    // A customer created here is rolled back if the booking loses its slot
    let (owner, user_created, persisted) = persistence.atomically(
        |persistence| -> Result<(OwnerSummary, bool, PersistedTransition), ApiError> {
            let (owner, user_created) = persistence.find_or_create_user(&phone, &profile)?;

            // Authorized above to book for any customer
            let transition: Transition = apply(
                &policy.settings,
                None,
                OwnerScope::Admin,
                Command::CreateReservation {
                    owner_id: owner.user_id,
                    service_name: input.service_name,
                    date: input.date,
                    time: input.time,
                    notes: input.notes,
                },
            )
            .map_err(translate_core_error)?;
            let persisted: PersistedTransition = persistence.persist_transition(&transition)?;
            Ok((owner, user_created, persisted))
        },
    )?;
    let booking: BookingSnapshot = publish_committed(bus, &persisted);

    info!(
        owner_id = owner.user_id,
        user_created,
        reservation_id = booking.id,
        "Agent booking created"
    );
    Ok(AgentBookingResponse {
        user_created,
        user: UserDetails::from(&owner),
        booking,
    })
}

// ============================================================================
// Admin back-office
// ============================================================================

/// Books on behalf of an existing user.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not an admin
/// - The user does not exist
/// - A field is missing or malformed, or the slot is invalid or held
pub fn admin_create_reservation(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    request: &AdminCreateReservationRequest,
) -> Result<BookingSnapshot, ApiError> {
    AuthorizationService::authorize_admin_bookings(caller)?;

    let mut errors: FieldErrors = FieldErrors::default();
    let user_id: Option<i64> = errors.required_number("user_id", request.user_id);
    let input: Option<BookingInput> = parse_booking(
        &mut errors,
        request.booking.service_name.as_deref(),
        request.booking.date.as_deref(),
        request.booking.time.as_deref(),
        request.booking.notes.as_deref(),
    );
    errors.finish()?;
    let (Some(user_id), Some(input)) = (user_id, input) else {
        return Err(ApiError::invalid("body", "Incomplete booking request"));
    };

    if persistence.get_user(user_id)?.is_none() {
        return Err(ApiError::NotFound {
            resource_type: String::from("User"),
            message: format!("User {user_id} does not exist"),
        });
    }

    run_command(
        persistence,
        bus,
        caller.scope(),
        None,
        Command::CreateReservation {
            owner_id: user_id,
            service_name: input.service_name,
            date: input.date,
            time: input.time,
            notes: input.notes,
        },
    )
}

/// Returns any reservation with its owner.
///
/// # Errors
///
/// Returns an error if the caller is not an admin or the reservation does
/// not exist.
pub fn admin_get_reservation(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
) -> Result<BookingSnapshot, ApiError> {
    AuthorizationService::authorize_admin_bookings(caller)?;
    get_reservation(persistence, caller, reservation_id)
}

/// Sets the status of any reservation.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the status is missing or
/// unknown, the transition is not allowed, or the reservation changed after
/// it was read (`Conflict`).
pub fn admin_update_status(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
    request: &StatusUpdateRequest,
) -> Result<BookingSnapshot, ApiError> {
    AuthorizationService::authorize_admin_bookings(caller)?;

    let mut errors: FieldErrors = FieldErrors::default();
    let status: Option<&str> = errors.required("status", request.status.as_deref());
    let status: Option<ReservationStatus> = errors.status(status);
    errors.finish()?;

    update_reservation(
        persistence,
        bus,
        caller,
        reservation_id,
        &UpdateReservationRequest {
            status: status.map(|s| s.as_str().to_string()),
            ..UpdateReservationRequest::default()
        },
    )
}

/// Removes a reservation from the ledger.
///
/// Subscribers receive `booking_deleted` with the record as it was just
/// before removal.
///
/// # Errors
///
/// Returns an error if the caller is not an admin or the reservation does
/// not exist.
pub fn admin_delete_reservation(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    caller: &AuthenticatedCaller,
    reservation_id: i64,
) -> Result<DeleteReservationResponse, ApiError> {
    AuthorizationService::authorize_admin_bookings(caller)?;
    info!(
        user_id = caller.user_id,
        reservation_id, "Handling delete_reservation request"
    );

    let current: Option<Reservation> = persistence.get_reservation(reservation_id)?;
    let snapshot: BookingSnapshot = run_command(
        persistence,
        bus,
        caller.scope(),
        current.as_ref(),
        Command::DeleteReservation { reservation_id },
    )?;

    Ok(DeleteReservationResponse {
        id: snapshot.id,
        message: format!("Reservation {} deleted", snapshot.id),
    })
}

/// Lists reservations with filters and paging.
///
/// # Errors
///
/// Returns an error if the caller is not an admin or a filter is malformed.
pub fn admin_list_reservations(
    persistence: &mut Persistence,
    caller: &AuthenticatedCaller,
    query: &ListReservationsQuery,
) -> Result<BookingListResponse, ApiError> {
    AuthorizationService::authorize_admin_bookings(caller)?;

    let mut errors: FieldErrors = FieldErrors::default();
    let date: Option<Date> = errors.date("date", query.date.as_deref());
    let status: Option<ReservationStatus> = errors.status(query.status.as_deref());
    errors.finish()?;

    let filter: ReservationFilter = ReservationFilter {
        date,
        service_name: query.service.clone().filter(|s| !s.trim().is_empty()),
        status,
        owner_id: query.user_id,
        phone: query.phone.clone().filter(|p| !p.trim().is_empty()),
    };
    let limit: i64 = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let offset: i64 = query.offset.unwrap_or(0).max(0);

    let page: ReservationPage = persistence.list_reservations(&filter, limit, offset)?;
    let returned: i64 = i64::try_from(page.records.len()).unwrap_or(i64::MAX);

    Ok(BookingListResponse {
        bookings: page.records.iter().map(BookingSnapshot::from).collect(),
        pagination: Pagination {
            total_count: page.total_count,
            limit,
            offset,
            has_more: offset.saturating_add(returned) < page.total_count,
        },
    })
}

/// The most recently created reservations, for live dashboard snapshots.
///
/// # Errors
///
/// Returns an error if the ledger cannot be read.
pub fn recent_bookings(
    persistence: &mut Persistence,
    limit: i64,
) -> Result<Vec<BookingSnapshot>, ApiError> {
    let records: Vec<ReservationWithOwner> = persistence.recent_reservations(limit)?;
    Ok(records.iter().map(BookingSnapshot::from).collect())
}
