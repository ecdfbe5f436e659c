// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation ledger queries.
//!
//! Dates and times are stored as canonical text (`YYYY-MM-DD`, `HH:MM`), so
//! text comparison and ordering agree with chronological order.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use reserva_domain::{
    OwnerSummary, Reservation, ReservationStatus, format_date, parse_wire_date, parse_wire_time,
};
use time::{Date, Time};
use tracing::debug;

use crate::data_models::{ReservationFilter, ReservationPage, ReservationWithOwner};
use crate::diesel_schema::{reservations, users};
use crate::error::PersistenceError;
use crate::queries::users::get_users;

/// Diesel Queryable struct for reservation rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = reservations)]
struct ReservationRow {
    reservation_id: i64,
    user_id: i64,
    service_name: String,
    booking_date: String,
    booking_time: String,
    duration_minutes: i32,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<Reservation, PersistenceError> {
        let id: i64 = self.reservation_id;
        let corrupt = |what: &str, detail: String| {
            PersistenceError::CorruptRow(format!("reservation {id} {what}: {detail}"))
        };

        let date: Date =
            parse_wire_date(&self.booking_date).map_err(|e| corrupt("date", e.to_string()))?;
        let time: Time =
            parse_wire_time(&self.booking_time).map_err(|e| corrupt("time", e.to_string()))?;
        let status: ReservationStatus =
            ReservationStatus::from_str(&self.status).map_err(|e| corrupt("status", e.to_string()))?;
        let duration_minutes: u32 = u32::try_from(self.duration_minutes)
            .map_err(|e| corrupt("duration", e.to_string()))?;

        Ok(Reservation {
            reservation_id: id,
            owner_id: self.user_id,
            service_name: self.service_name,
            date,
            time,
            duration_minutes,
            status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Status strings of reservations that hold their slot.
fn slot_holding_statuses() -> Vec<&'static str> {
    [
        ReservationStatus::Upcoming,
        ReservationStatus::Cancelled,
        ReservationStatus::Completed,
    ]
    .iter()
    .filter(|s| s.occupies_slot())
    .map(ReservationStatus::as_str)
    .collect()
}

/// Escape character for substring `LIKE` patterns.
const LIKE_ESCAPE: char = '\\';

/// Turns user input into a `%…%` substring pattern that matches it literally.
///
/// `%`, `_`, and the escape character itself are escaped, so the input never
/// acts as a wildcard.
fn contains_pattern(input: &str) -> String {
    let mut pattern: String = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Builds the filtered base query shared by listing and counting.
fn filtered(filter: &ReservationFilter) -> reservations::BoxedQuery<'static, Sqlite> {
    let mut query: reservations::BoxedQuery<'static, Sqlite> = reservations::table.into_boxed();

    if let Some(date) = filter.date {
        query = query.filter(reservations::booking_date.eq(format_date(date)));
    }
    if let Some(service_name) = &filter.service_name {
        query = query.filter(
            reservations::service_name
                .like(contains_pattern(service_name))
                .escape(LIKE_ESCAPE),
        );
    }
    if let Some(status) = filter.status {
        query = query.filter(reservations::status.eq(status.as_str()));
    }
    if let Some(owner_id) = filter.owner_id {
        query = query.filter(reservations::user_id.eq(owner_id));
    }
    if let Some(phone) = &filter.phone {
        query = query.filter(
            reservations::user_id.eq_any(
                users::table
                    .filter(users::phone.like(contains_pattern(phone)).escape(LIKE_ESCAPE))
                    .select(users::user_id),
            ),
        );
    }

    query
}

/// Attaches owner summaries to reservation rows.
fn with_owners(
    conn: &mut SqliteConnection,
    rows: Vec<ReservationRow>,
) -> Result<Vec<ReservationWithOwner>, PersistenceError> {
    let owner_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
    let owners: HashMap<i64, OwnerSummary> = get_users(conn, &owner_ids)?;

    rows.into_iter()
        .map(|row| {
            let owner: OwnerSummary = owners
                .get(&row.user_id)
                .cloned()
                .ok_or_else(|| {
                    PersistenceError::ReferenceNotFound(format!(
                        "owner {} of reservation {}",
                        row.user_id, row.reservation_id
                    ))
                })?;
            Ok(ReservationWithOwner {
                reservation: row.into_reservation()?,
                owner,
            })
        })
        .collect()
}

/// Retrieves a reservation by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the reservation is not found.
pub fn get_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Option<Reservation>, PersistenceError> {
    debug!(reservation_id, "Looking up reservation");

    reservations::table
        .filter(reservations::reservation_id.eq(reservation_id))
        .select(ReservationRow::as_select())
        .first(conn)
        .optional()?
        .map(ReservationRow::into_reservation)
        .transpose()
}

/// Retrieves a reservation together with its owner.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the reservation is not found.
pub fn get_reservation_with_owner(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Option<ReservationWithOwner>, PersistenceError> {
    let row: Option<ReservationRow> = reservations::table
        .filter(reservations::reservation_id.eq(reservation_id))
        .select(ReservationRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(with_owners(conn, vec![row])?.into_iter().next()),
        None => Ok(None),
    }
}

/// Lists reservations matching `filter`, newest booking first.
///
/// Ordering is by booking date, then slot time, then ID, all descending.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `filter` - The listing criteria
/// * `limit` - Maximum number of records to return
/// * `offset` - Number of matching records to skip
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_reservations(
    conn: &mut SqliteConnection,
    filter: &ReservationFilter,
    limit: i64,
    offset: i64,
) -> Result<ReservationPage, PersistenceError> {
    debug!(?filter, limit, offset, "Listing reservations");

    let total_count: i64 = filtered(filter).count().get_result(conn)?;

    let rows: Vec<ReservationRow> = filtered(filter)
        .order((
            reservations::booking_date.desc(),
            reservations::booking_time.desc(),
            reservations::reservation_id.desc(),
        ))
        .limit(limit)
        .offset(offset)
        .select(ReservationRow::as_select())
        .load(conn)?;

    Ok(ReservationPage {
        records: with_owners(conn, rows)?,
        total_count,
    })
}

/// Lists the most recently created reservations.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn recent_reservations(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<ReservationWithOwner>, PersistenceError> {
    // IDs are assigned in creation order
    let rows: Vec<ReservationRow> = reservations::table
        .order(reservations::reservation_id.desc())
        .limit(limit)
        .select(ReservationRow::as_select())
        .load(conn)?;

    with_owners(conn, rows)
}

/// Start times of slot-holding reservations on `date`.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored time is invalid.
pub fn booked_times_on(
    conn: &mut SqliteConnection,
    date: Date,
) -> Result<BTreeSet<Time>, PersistenceError> {
    let times: Vec<String> = reservations::table
        .filter(reservations::booking_date.eq(format_date(date)))
        .filter(reservations::status.eq_any(slot_holding_statuses()))
        .select(reservations::booking_time)
        .load(conn)?;

    times
        .iter()
        .map(|t| parse_wire_time(t).map_err(|e| PersistenceError::CorruptRow(e.to_string())))
        .collect()
}

/// Start times of slot-holding reservations per date in `[first, last]`.
///
/// Dates without reservations are absent from the map.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value is invalid.
pub fn booked_times_between(
    conn: &mut SqliteConnection,
    first: Date,
    last: Date,
) -> Result<BTreeMap<Date, BTreeSet<Time>>, PersistenceError> {
    let rows: Vec<(String, String)> = reservations::table
        .filter(reservations::booking_date.ge(format_date(first)))
        .filter(reservations::booking_date.le(format_date(last)))
        .filter(reservations::status.eq_any(slot_holding_statuses()))
        .select((reservations::booking_date, reservations::booking_time))
        .load(conn)?;

    let mut booked: BTreeMap<Date, BTreeSet<Time>> = BTreeMap::new();
    for (date, time) in rows {
        let date: Date =
            parse_wire_date(&date).map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;
        let time: Time =
            parse_wire_time(&time).map_err(|e| PersistenceError::CorruptRow(e.to_string()))?;
        booked.entry(date).or_default().insert(time);
    }
    Ok(booked)
}
