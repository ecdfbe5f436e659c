// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `policies` - Atomic activation and in-place update of the booking policy
//! - `reservations` - Ledger inserts, updates, and deletes
//! - `users` - Find-or-create by phone

pub mod policies;
pub mod reservations;
pub mod users;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PersistenceError;

/// The current UTC time as an RFC 3339 string, truncated to whole seconds.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn now_timestamp() -> Result<String, PersistenceError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    now.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}
