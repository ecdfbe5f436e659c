// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for Reserva.
//!
//! This crate sits between the transport and the ledger. It owns:
//!
//! - Request and response shapes for every operation
//! - Role-based authorization of identified callers
//! - Translation of domain, core, and storage errors into the API contract
//! - Publishing booking events after every committed mutation
//!
//! It knows nothing about HTTP. The server crate maps [`ApiError::kind`] to
//! status codes and drives these handlers from its routes.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedCaller, AuthorizationService, Role};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    admin_create_reservation, admin_delete_reservation, admin_get_reservation,
    admin_list_reservations, admin_update_status, agent_create_booking, cancel_reservation,
    create_booking_settings, create_reservation, get_available_slots, get_booking_calendar,
    get_booking_settings, get_reservation, list_own_reservations, recent_bookings,
    update_booking_settings, update_reservation,
};
pub use notify::{
    ADMIN_BOOKINGS_GROUP, BookingEvent, BusError, NotificationBus, publish_best_effort,
};
pub use request_response::{
    AdminCreateReservationRequest, AgentBookingRequest, AgentBookingResponse,
    AvailableSlotsQuery, AvailableSlotsResponse, BookingListResponse, BookingSettingsRequest,
    BookingSettingsResponse, BookingSnapshot, CalendarDayInfo, CalendarQuery, CalendarResponse,
    CreateReservationRequest, DEFAULT_LIST_LIMIT, DeleteReservationResponse,
    ListReservationsQuery, MAX_LIST_LIMIT, Pagination, ReservationListResponse, SlotInfo,
    StatusUpdateRequest, UpdateReservationRequest, UserDetails, WorkingHours,
};
