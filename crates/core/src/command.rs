// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::ReservationStatus;
use time::{Date, Time};

/// A command represents caller intent against the reservation ledger as data only.
///
/// Commands are the only way to request ledger changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Book a slot.
    CreateReservation {
        /// The user the reservation belongs to.
        owner_id: i64,
        /// The requested service.
        service_name: String,
        /// The requested date (already normalised from the wire).
        date: Date,
        /// The requested slot start (already normalised from the wire).
        time: Time,
        /// Free-form notes.
        notes: Option<String>,
    },
    /// Partially update an existing reservation.
    UpdateReservation {
        /// The reservation to change.
        reservation_id: i64,
        /// The fields to change.
        patch: ReservationPatch,
    },
    /// Cancel a reservation, freeing its slot.
    CancelReservation {
        /// The reservation to cancel.
        reservation_id: i64,
    },
    /// Remove a reservation from the ledger entirely.
    DeleteReservation {
        /// The reservation to remove.
        reservation_id: i64,
    },
}

/// Requested changes to a reservation, before validation.
///
/// `None` leaves a field untouched. For `notes`, `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationPatch {
    /// New service name.
    pub service_name: Option<String>,
    /// New date.
    pub date: Option<Date>,
    /// New slot start.
    pub time: Option<Time>,
    /// New status.
    pub status: Option<ReservationStatus>,
    /// New notes.
    pub notes: Option<Option<String>>,
}
