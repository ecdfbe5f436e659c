// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking notifications for live admin dashboards.
//!
//! Every successful ledger mutation is published to the
//! [`ADMIN_BOOKINGS_GROUP`] group after the write has committed.
//!
//! # Delivery
//!
//! - At most once per subscriber, with no replay for late joiners
//! - Publishing with no subscribers is a silent no-op
//! - A failing bus is logged and ignored; it never fails the mutation

use reserva_domain::BookingEventKind;
use serde::Serialize;
use tracing::{debug, warn};

use crate::request_response::BookingSnapshot;

/// The group every admin dashboard connection joins.
pub const ADMIN_BOOKINGS_GROUP: &str = "admin_bookings";

/// Notification bus failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// The bus cannot accept messages.
    #[error("notification bus unavailable: {0}")]
    Unavailable(String),
    /// The event could not be encoded for delivery.
    #[error("failed to encode notification: {0}")]
    Encoding(String),
}

/// A booking mutation as delivered to subscribers.
///
/// Serializes as `{"type": "booking_created", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingEvent {
    /// The live-channel message type.
    #[serde(rename = "type")]
    pub message_type: &'static str,
    /// The reservation and owner snapshot.
    pub data: BookingSnapshot,
    /// The mutation kind.
    #[serde(skip)]
    pub kind: BookingEventKind,
}

impl BookingEvent {
    /// Creates an event of `kind` carrying `data`.
    #[must_use]
    pub const fn new(kind: BookingEventKind, data: BookingSnapshot) -> Self {
        Self {
            message_type: kind.message_type(),
            data,
            kind,
        }
    }
}

/// A publish/subscribe fan-out for booking events.
///
/// Implementations must not block waiting for subscribers.
pub trait NotificationBus: Send + Sync {
    /// Publishes `event` to every current subscriber of `group`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus itself is unavailable. Having no
    /// subscribers is not an error.
    fn publish(&self, group: &str, event: &BookingEvent) -> Result<(), BusError>;
}

/// Publishes `event` to the admin group, logging and discarding any failure.
pub fn publish_best_effort(bus: &dyn NotificationBus, event: &BookingEvent) {
    match bus.publish(ADMIN_BOOKINGS_GROUP, event) {
        Ok(()) => debug!(
            message_type = event.message_type,
            reservation_id = event.data.id,
            "Published booking event"
        ),
        Err(e) => warn!(
            error = %e,
            message_type = event.message_type,
            reservation_id = event.data.id,
            "Failed to publish booking event"
        ),
    }
}
