// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod caller;
mod live;

use axum::{
    Json, Router,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono_tz::Tz;
use clap::Parser;
use reserva_api::{
    AdminCreateReservationRequest, AgentBookingRequest, AgentBookingResponse, ApiError,
    AvailableSlotsQuery, AvailableSlotsResponse, BookingListResponse, BookingSettingsRequest,
    BookingSettingsResponse, BookingSnapshot, CalendarQuery, CalendarResponse,
    CreateReservationRequest, DeleteReservationResponse, ListReservationsQuery,
    ReservationListResponse, StatusUpdateRequest, UpdateReservationRequest,
    admin_create_reservation, admin_delete_reservation, admin_get_reservation,
    admin_list_reservations, admin_update_status, agent_create_booking, cancel_reservation,
    create_booking_settings, create_reservation, get_available_slots, get_booking_calendar,
    get_booking_settings, get_reservation, list_own_reservations, translate_domain_error,
    update_booking_settings, update_reservation,
};
use reserva_domain::{parse_timezone, today_in};
use reserva_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::Date;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::caller::{Caller, JsonBody, QueryParams, ReservationId};
use crate::live::{LiveEventBus, admin_bookings_socket};

/// Reserva Server - booking and reservation backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "RESERVA_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, env = "RESERVA_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "RESERVA_PORT", default_value_t = 3000)]
    port: u16,

    /// Business timezone (IANA name) used for "today" in the calendar
    #[arg(short, long, env = "RESERVA_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Number of bookings sent in a live-channel snapshot
    #[arg(long, env = "RESERVA_SNAPSHOT_LIMIT", default_value_t = 50)]
    snapshot_limit: i64,
}

/// Application state shared across handlers.
///
/// The ledger connection is serialised behind a Mutex; the slot index, not
/// the Mutex, is what prevents double-booking.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Live channel for admin dashboards.
    bus: Arc<LiveEventBus>,
    /// The business timezone.
    timezone: Tz,
    /// Size of the live-channel `get_bookings` snapshot.
    snapshot_limit: i64,
}

impl AppState {
    /// Today's date in the business timezone.
    fn today(&self) -> Result<Date, HttpError> {
        today_in(self.timezone).map_err(|e| HttpError::from(translate_domain_error(e)))
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// The machine-readable error kind.
    error: String,
    /// A human-readable message.
    message: String,
    /// Per-field messages, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The response body.
    body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::ValidationError { .. }
            | ApiError::SlotTaken { .. }
            | ApiError::OffDay { .. }
            | ApiError::OutsideWorkingHours { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message: String = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "Internal error");
            String::from("Internal server error")
        } else {
            err.to_string()
        };

        Self {
            status,
            body: ErrorResponse {
                error: err.kind().to_string(),
                message,
                fields: err.fields().cloned(),
            },
        }
    }
}

// ============================================================================
// Booking settings
// ============================================================================

/// Handler for GET `/booking-settings`.
async fn handle_get_booking_settings(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<BookingSettingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_booking_settings(&mut persistence)?))
}

/// Handler for POST `/booking-settings`.
///
/// Replaces the active policy.
async fn handle_create_booking_settings(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<BookingSettingsRequest>,
) -> Result<(StatusCode, Json<BookingSettingsResponse>), HttpError> {
    info!(user_id = caller.user_id, "Handling create_booking_settings request");

    let mut persistence = app_state.persistence.lock().await;
    let response: BookingSettingsResponse =
        create_booking_settings(&mut persistence, &caller, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT `/booking-settings`.
///
/// Applies a partial update to the active policy.
async fn handle_update_booking_settings(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<BookingSettingsRequest>,
) -> Result<Json<BookingSettingsResponse>, HttpError> {
    info!(user_id = caller.user_id, "Handling update_booking_settings request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_booking_settings(&mut persistence, &caller, &req)?))
}

// ============================================================================
// Availability
// ============================================================================

/// Handler for GET `/available-slots`.
async fn handle_get_available_slots(
    AxumState(app_state): AxumState<AppState>,
    QueryParams(query): QueryParams<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_available_slots(&mut persistence, &query)?))
}

/// Handler for GET `/booking-calendar`.
async fn handle_get_booking_calendar(
    AxumState(app_state): AxumState<AppState>,
    QueryParams(query): QueryParams<CalendarQuery>,
) -> Result<Json<CalendarResponse>, HttpError> {
    let today: Date = app_state.today()?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_booking_calendar(&mut persistence, &query, today)?))
}

// ============================================================================
// Customer reservations
// ============================================================================

/// Handler for GET `/reservations`.
async fn handle_list_own_reservations(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
) -> Result<Json<ReservationListResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_own_reservations(&mut persistence, &caller)?))
}

/// Handler for POST `/reservations`.
async fn handle_create_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<CreateReservationRequest>,
) -> Result<(StatusCode, Json<BookingSnapshot>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let snapshot: BookingSnapshot =
        create_reservation(&mut persistence, app_state.bus.as_ref(), &caller, &req)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Handler for GET `/reservations/{id}`.
async fn handle_get_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
) -> Result<Json<BookingSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_reservation(&mut persistence, &caller, id)?))
}

/// Handler for PUT `/reservations/{id}`.
async fn handle_update_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
    JsonBody(req): JsonBody<UpdateReservationRequest>,
) -> Result<Json<BookingSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_reservation(
        &mut persistence,
        app_state.bus.as_ref(),
        &caller,
        id,
        &req,
    )?))
}

/// Handler for DELETE `/reservations/{id}`.
///
/// Cancels the reservation; the record is kept.
async fn handle_cancel_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
) -> Result<Json<BookingSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(cancel_reservation(
        &mut persistence,
        app_state.bus.as_ref(),
        &caller,
        id,
    )?))
}

// ============================================================================
// Agent and admin bookings
// ============================================================================

/// Handler for POST `/agent/bookings`.
async fn handle_agent_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<AgentBookingRequest>,
) -> Result<(StatusCode, Json<AgentBookingResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AgentBookingResponse =
        agent_create_booking(&mut persistence, app_state.bus.as_ref(), &caller, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/admin/bookings`.
async fn handle_admin_list_reservations(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    QueryParams(query): QueryParams<ListReservationsQuery>,
) -> Result<Json<BookingListResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(admin_list_reservations(
        &mut persistence,
        &caller,
        &query,
    )?))
}

/// Handler for POST `/admin/bookings`.
async fn handle_admin_create_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<AdminCreateReservationRequest>,
) -> Result<(StatusCode, Json<BookingSnapshot>), HttpError> {
    info!(user_id = caller.user_id, "Handling admin_create_reservation request");

    let mut persistence = app_state.persistence.lock().await;
    let snapshot: BookingSnapshot =
        admin_create_reservation(&mut persistence, app_state.bus.as_ref(), &caller, &req)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Handler for GET `/admin/bookings/{id}`.
async fn handle_admin_get_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
) -> Result<Json<BookingSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(admin_get_reservation(&mut persistence, &caller, id)?))
}

/// Handler for DELETE `/admin/bookings/{id}`.
///
/// Hard-deletes the reservation.
async fn handle_admin_delete_reservation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
) -> Result<Json<DeleteReservationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(admin_delete_reservation(
        &mut persistence,
        app_state.bus.as_ref(),
        &caller,
        id,
    )?))
}

/// Handler for PUT `/admin/bookings/{id}/status`.
async fn handle_admin_update_status(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    ReservationId(id): ReservationId,
    JsonBody(req): JsonBody<StatusUpdateRequest>,
) -> Result<Json<BookingSnapshot>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(admin_update_status(
        &mut persistence,
        app_state.bus.as_ref(),
        &caller,
        id,
        &req,
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/booking-settings",
            get(handle_get_booking_settings)
                .post(handle_create_booking_settings)
                .put(handle_update_booking_settings),
        )
        .route("/available-slots", get(handle_get_available_slots))
        .route("/booking-calendar", get(handle_get_booking_calendar))
        .route(
            "/reservations",
            get(handle_list_own_reservations).post(handle_create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handle_get_reservation)
                .put(handle_update_reservation)
                .delete(handle_cancel_reservation),
        )
        .route(
            "/agent/bookings",
            post(handle_agent_create_booking),
        )
        .route(
            "/admin/bookings",
            get(handle_admin_list_reservations).post(handle_admin_create_reservation),
        )
        .route(
            "/admin/bookings/{id}",
            get(handle_admin_get_reservation).delete(handle_admin_delete_reservation),
        )
        .route(
            "/admin/bookings/{id}/status",
            put(handle_admin_update_status),
        )
        .route("/ws/admin/bookings", get(admin_bookings_socket))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Reserva Server");

    let timezone: Tz = parse_timezone(&args.timezone)?;
    info!(timezone = %timezone, "Business timezone");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let policy = persistence.active_policy_or_default()?;
    info!(
        policy_id = policy.policy_id,
        working_hours_start = policy.settings.working_hours_start(),
        working_hours_end = policy.settings.working_hours_end(),
        slot_duration_minutes = policy.settings.slot_duration_minutes(),
        "Active booking policy"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        bus: Arc::new(LiveEventBus::new()),
        timezone,
        snapshot_limit: args.snapshot_limit.max(1),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
