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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod transition;

#[cfg(test)]
mod tests;

use reserva_domain::{OwnerScope, Reservation};

// Re-export public types and functions
pub use apply::apply;
pub use command::{Command, ReservationPatch};
pub use error::CoreError;
pub use transition::Transition;

/// Resolves a reservation lookup against the caller's scope.
///
/// This is a read-only check shared by queries and commands. A reservation
/// that exists but belongs to someone else is reported exactly like one that
/// does not exist.
///
/// # Arguments
///
/// * `scope` - The caller's visibility scope
/// * `reservation_id` - The requested reservation
/// * `current` - The stored reservation, if any
///
/// # Returns
///
/// * `Ok(&Reservation)` if the reservation exists and is visible
/// * `Err(CoreError::NotVisible)` otherwise
///
/// # Errors
///
/// Returns an error if the reservation is missing or outside the scope.
pub fn resolve_visible(
    scope: OwnerScope,
    reservation_id: i64,
    current: Option<&Reservation>,
) -> Result<&Reservation, CoreError> {
    current
        .filter(|r| r.reservation_id == reservation_id && scope.permits(r.owner_id))
        .ok_or(CoreError::NotVisible { reservation_id })
}
