// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation ledger mutations.
//!
//! No function here checks for slot conflicts before writing. The partial
//! unique index `idx_reservations_active_slot` arbitrates, so the check and
//! the write are one atomic statement and concurrent writers cannot both win.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reserva_domain::{
    NewReservation, ReservationChanges, ReservationStatus, format_date, format_time,
};
use tracing::{debug, info, warn};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::reservations;
use crate::error::{PersistenceError, map_slot_write_error};
use crate::mutations::now_timestamp;

/// Column changes for a reservation update. `None` leaves a column untouched.
#[derive(AsChangeset)]
#[diesel(table_name = reservations)]
struct ReservationChangeset<'a> {
    service_name: Option<&'a str>,
    booking_date: Option<String>,
    booking_time: Option<String>,
    duration_minutes: Option<i32>,
    status: Option<&'static str>,
    notes: Option<Option<&'a str>>,
    updated_at: String,
}

fn duration_column(minutes: u32) -> Result<i32, PersistenceError> {
    i32::try_from(minutes).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Inserts a reservation with status `upcoming`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `reservation` - The validated reservation
///
/// # Returns
///
/// The ID assigned to the new reservation.
///
/// # Errors
///
/// Returns `PersistenceError::SlotConflict` if a slot-holding reservation
/// already exists at the same date and time, or
/// `PersistenceError::ReferenceNotFound` if the owner does not exist.
pub fn insert_reservation(
    conn: &mut SqliteConnection,
    reservation: &NewReservation,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    debug!(
        owner_id = reservation.owner_id,
        date = %format_date(reservation.date),
        time = %format_time(reservation.time),
        "Inserting reservation"
    );

    diesel::insert_into(reservations::table)
        .values((
            reservations::user_id.eq(reservation.owner_id),
            reservations::service_name.eq(&reservation.service_name),
            reservations::booking_date.eq(format_date(reservation.date)),
            reservations::booking_time.eq(format_time(reservation.time)),
            reservations::duration_minutes.eq(duration_column(reservation.duration_minutes)?),
            reservations::status.eq("upcoming"),
            reservations::notes.eq(reservation.notes.as_deref()),
            reservations::created_at.eq(&now),
            reservations::updated_at.eq(&now),
        ))
        .execute(conn)
        .map_err(|e| map_slot_write_error(e, reservation.date, reservation.time))?;

    let reservation_id: i64 = conn.get_last_insert_rowid()?;
    info!(reservation_id, "Reservation created");
    Ok(reservation_id)
}

/// Applies column changes to an existing reservation.
///
/// The update is conditional: it only matches the row while its status and
/// `updated_at` still equal the values the changes were planned from.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `reservation_id` - The reservation to change
/// * `expected_status` - The status the changes were validated against
/// * `expected_updated_at` - The `updated_at` stamp that was read
/// * `changes` - The columns to write
///
/// # Errors
///
/// Returns `PersistenceError::SlotConflict` if the reservation is moved onto
/// a held slot, `PersistenceError::StaleWrite` if the row changed since it
/// was read, or `PersistenceError::NotFound` if it does not exist.
pub fn update_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    expected_status: ReservationStatus,
    expected_updated_at: &str,
    changes: &ReservationChanges,
) -> Result<(), PersistenceError> {
    let changeset: ReservationChangeset<'_> = ReservationChangeset {
        service_name: changes.service_name.as_deref(),
        booking_date: changes.date.map(format_date),
        booking_time: changes.time.map(format_time),
        duration_minutes: changes.duration_minutes.map(duration_column).transpose()?,
        status: changes.status.as_ref().map(ReservationStatus::as_str),
        notes: changes.notes.as_ref().map(Option::as_deref),
        updated_at: now_timestamp()?,
    };

    let rows_affected: usize = diesel::update(reservations::table)
        .filter(reservations::reservation_id.eq(reservation_id))
        .filter(reservations::status.eq(expected_status.as_str()))
        .filter(reservations::updated_at.eq(expected_updated_at))
        .set(&changeset)
        .execute(conn)
        .map_err(|e| match (changes.date, changes.time) {
            (Some(date), Some(time)) => map_slot_write_error(e, date, time),
            _ => PersistenceError::from(e),
        })?;

    if rows_affected == 0 {
        let exists: i64 = reservations::table
            .filter(reservations::reservation_id.eq(reservation_id))
            .count()
            .get_result(conn)?;
        if exists == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Reservation {reservation_id}"
            )));
        }
        warn!(
            reservation_id,
            expected_status = expected_status.as_str(),
            "Refusing stale reservation update"
        );
        return Err(PersistenceError::StaleWrite { reservation_id });
    }

    info!(reservation_id, "Reservation updated");
    Ok(())
}

/// Removes a reservation from the ledger.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the reservation does not exist.
pub fn delete_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(reservations::table)
        .filter(reservations::reservation_id.eq(reservation_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Reservation {reservation_id}"
        )));
    }

    info!(reservation_id, "Reservation deleted");
    Ok(())
}
