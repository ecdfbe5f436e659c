// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User directory mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reserva_domain::{OwnerProfile, OwnerSummary};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::users;
use crate::error::PersistenceError;
use crate::mutations::now_timestamp;
use crate::queries::users::{find_user_by_phone, get_user};

/// Creates a user keyed by `phone`.
///
/// Absent name and email fields are stored as empty strings; absent gender
/// and country stay `NULL`.
///
/// # Errors
///
/// Returns an error if the insert fails (including a duplicate phone).
pub fn create_user(
    conn: &mut SqliteConnection,
    phone: &str,
    profile: &OwnerProfile,
) -> Result<OwnerSummary, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(users::table)
        .values((
            users::phone.eq(phone),
            users::first_name.eq(profile.first_name.as_deref().unwrap_or_default()),
            users::last_name.eq(profile.last_name.as_deref().unwrap_or_default()),
            users::email.eq(profile.email.as_deref().unwrap_or_default()),
            users::gender.eq(profile.gender.as_deref()),
            users::country.eq(profile.country.as_deref()),
            users::is_active.eq(1),
            users::date_joined.eq(&now),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;
    info!(user_id, "Created user");

    get_user(conn, user_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("User {user_id}")))
}

/// Resolves `phone` to an account, creating it on first use.
///
/// # Returns
///
/// The account and whether it was created by this call.
///
/// # Errors
///
/// Returns an error if the lookup or insert fails.
pub fn find_or_create_user(
    conn: &mut SqliteConnection,
    phone: &str,
    profile: &OwnerProfile,
) -> Result<(OwnerSummary, bool), PersistenceError> {
    conn.transaction::<(OwnerSummary, bool), PersistenceError, _>(|conn| {
        if let Some(existing) = find_user_by_phone(conn, phone)? {
            return Ok((existing, false));
        }
        Ok((create_user(conn, phone, profile)?, true))
    })
}
