// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::{
    BookingEventKind, NewReservation, Reservation, ReservationChanges, ReservationStatus,
};

/// The ledger write a command resolved to.
///
/// Produced by [`crate::apply`]; carried out by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Insert a new reservation. The storage layer arbitrates slot conflicts.
    Insert(NewReservation),
    /// Change columns of an existing reservation.
    ///
    /// The write only lands if the stored row still carries the status and
    /// `updated_at` the changes were planned from.
    Update {
        /// The reservation to change.
        reservation_id: i64,
        /// The status the plan was validated against.
        expected_status: ReservationStatus,
        /// The `updated_at` stamp of the row the plan was read from.
        expected_updated_at: String,
        /// The validated, non-empty changes.
        changes: ReservationChanges,
    },
    /// Remove a reservation.
    Delete {
        /// The reservation to remove.
        reservation_id: i64,
    },
    /// Nothing to write; the current record is already in the requested state.
    Unchanged(Reservation),
}

impl Transition {
    /// The notification this transition publishes once written, if any.
    #[must_use]
    pub const fn event_kind(&self) -> Option<BookingEventKind> {
        match self {
            Self::Insert(_) => Some(BookingEventKind::Created),
            Self::Update { .. } => Some(BookingEventKind::Updated),
            Self::Delete { .. } => Some(BookingEventKind::Deleted),
            Self::Unchanged(_) => None,
        }
    }
}
