// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking policy mutations.
//!
//! The single-active-policy invariant is held two ways: every activation
//! deactivates the previous row and inserts the new one inside one
//! transaction, and a partial unique index rejects a second active row.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reserva_domain::PolicySettings;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::booking_policies;
use crate::error::PersistenceError;
use crate::mutations::now_timestamp;

fn off_days_json(settings: &PolicySettings) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(settings.off_days())?)
}

/// Atomically replaces the active policy with a new one.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `settings` - The validated policy parameters
///
/// # Returns
///
/// The ID of the newly active policy.
///
/// # Errors
///
/// Returns an error if the transaction fails; nothing is changed in that case.
pub fn activate_policy(
    conn: &mut SqliteConnection,
    settings: &PolicySettings,
) -> Result<i64, PersistenceError> {
    let off_days: String = off_days_json(settings)?;
    let now: String = now_timestamp()?;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        let deactivated: usize = diesel::update(booking_policies::table)
            .filter(booking_policies::is_active.eq(1))
            .set((
                booking_policies::is_active.eq(0),
                booking_policies::updated_at.eq(&now),
            ))
            .execute(conn)?;

        diesel::insert_into(booking_policies::table)
            .values((
                booking_policies::working_hours_start
                    .eq(i32::from(settings.working_hours_start())),
                booking_policies::working_hours_end.eq(i32::from(settings.working_hours_end())),
                booking_policies::slot_duration_minutes.eq(duration_column(settings)?),
                booking_policies::off_days.eq(&off_days),
                booking_policies::is_active.eq(1),
                booking_policies::created_at.eq(&now),
                booking_policies::updated_at.eq(&now),
            ))
            .execute(conn)?;

        let policy_id: i64 = conn.get_last_insert_rowid()?;
        info!(policy_id, deactivated, "Activated booking policy");
        Ok(policy_id)
    })
}

/// Overwrites the parameters of an existing policy in place.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the policy does not exist.
pub fn update_policy(
    conn: &mut SqliteConnection,
    policy_id: i64,
    settings: &PolicySettings,
) -> Result<(), PersistenceError> {
    let off_days: String = off_days_json(settings)?;
    let now: String = now_timestamp()?;

    let rows_affected: usize = diesel::update(booking_policies::table)
        .filter(booking_policies::policy_id.eq(policy_id))
        .set((
            booking_policies::working_hours_start.eq(i32::from(settings.working_hours_start())),
            booking_policies::working_hours_end.eq(i32::from(settings.working_hours_end())),
            booking_policies::slot_duration_minutes.eq(duration_column(settings)?),
            booking_policies::off_days.eq(&off_days),
            booking_policies::updated_at.eq(&now),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Booking policy {policy_id}"
        )));
    }

    info!(policy_id, "Updated booking policy");
    Ok(())
}

fn duration_column(settings: &PolicySettings) -> Result<i32, PersistenceError> {
    i32::try_from(settings.slot_duration_minutes())
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}
