// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User directory queries.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::SqliteConnection;
use reserva_domain::OwnerSummary;
use tracing::debug;

use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    phone: String,
    first_name: String,
    last_name: String,
    email: String,
    gender: Option<String>,
    country: Option<String>,
    is_active: i32,
    date_joined: String,
}

impl From<UserRow> for OwnerSummary {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            phone: row.phone,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_active: row.is_active != 0,
            date_joined: row.date_joined,
            gender: row.gender,
            country: row.country,
        }
    }
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<OwnerSummary>, PersistenceError> {
    debug!(user_id, "Looking up user");

    Ok(users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(OwnerSummary::from))
}

/// Retrieves a user by phone number.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no account uses this phone number.
pub fn find_user_by_phone(
    conn: &mut SqliteConnection,
    phone: &str,
) -> Result<Option<OwnerSummary>, PersistenceError> {
    debug!("Looking up user by phone");

    Ok(users::table
        .filter(users::phone.eq(phone))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(OwnerSummary::from))
}

/// Retrieves several users at once, keyed by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_users(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
) -> Result<HashMap<i64, OwnerSummary>, PersistenceError> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<UserRow> = users::table
        .filter(users::user_id.eq_any(user_ids))
        .select(UserRow::as_select())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.user_id, OwnerSummary::from(row)))
        .collect())
}
