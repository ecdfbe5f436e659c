// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking policy queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use reserva_domain::{BookingPolicy, PolicySettings};
use tracing::debug;

use crate::diesel_schema::booking_policies;
use crate::error::PersistenceError;

/// Diesel Queryable struct for policy rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = booking_policies)]
struct PolicyRow {
    policy_id: i64,
    working_hours_start: i32,
    working_hours_end: i32,
    slot_duration_minutes: i32,
    off_days: String,
    is_active: i32,
    created_at: String,
    updated_at: String,
}

impl PolicyRow {
    /// Re-validates the stored row through the domain constructor.
    fn into_policy(self) -> Result<BookingPolicy, PersistenceError> {
        let off_days: Vec<i64> = serde_json::from_str(&self.off_days)?;
        let settings: PolicySettings = PolicySettings::new(
            i64::from(self.working_hours_start),
            i64::from(self.working_hours_end),
            i64::from(self.slot_duration_minutes),
            &off_days,
        )
        .map_err(|e| {
            PersistenceError::CorruptRow(format!("booking policy {}: {e}", self.policy_id))
        })?;

        Ok(BookingPolicy {
            policy_id: self.policy_id,
            settings,
            is_active: self.is_active != 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Retrieves the single active policy.
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Errors
///
/// Returns an error if the database query fails or the stored row is invalid.
/// Returns `Ok(None)` if no policy has ever been activated.
pub fn get_active_policy(
    conn: &mut SqliteConnection,
) -> Result<Option<BookingPolicy>, PersistenceError> {
    debug!("Loading active booking policy");

    booking_policies::table
        .filter(booking_policies::is_active.eq(1))
        .select(PolicyRow::as_select())
        .first(conn)
        .optional()?
        .map(PolicyRow::into_policy)
        .transpose()
}

/// Retrieves a policy by ID, active or not.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no such policy exists.
pub fn get_policy(
    conn: &mut SqliteConnection,
    policy_id: i64,
) -> Result<BookingPolicy, PersistenceError> {
    let row: PolicyRow = booking_policies::table
        .filter(booking_policies::policy_id.eq(policy_id))
        .select(PolicyRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Booking policy {policy_id}")))?;
    row.into_policy()
}
