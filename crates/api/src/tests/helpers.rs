// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;

use reserva_domain::{OwnerProfile, OwnerSummary};
use reserva_persistence::Persistence;
use time::Date;
use time::macros::date;

use crate::{
    AuthenticatedCaller, BookingEvent, BookingSnapshot, BusError, CreateReservationRequest,
    NotificationBus, Role, create_reservation,
};

/// A Monday.
pub const MONDAY: Date = date!(2025 - 11 - 03);

/// Records every published event.
#[derive(Default)]
pub struct RecordingBus {
    events: Mutex<Vec<(String, BookingEvent)>>,
}

impl RecordingBus {
    pub fn events(&self) -> Vec<(String, BookingEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn message_types(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|(_, event)| event.message_type)
            .collect()
    }
}

impl NotificationBus for RecordingBus {
    fn publish(&self, group: &str, event: &BookingEvent) -> Result<(), BusError> {
        self.events
            .lock()
            .unwrap()
            .push((group.to_string(), event.clone()));
        Ok(())
    }
}

/// A bus that rejects every message.
pub struct FailingBus;

impl NotificationBus for FailingBus {
    fn publish(&self, _group: &str, _event: &BookingEvent) -> Result<(), BusError> {
        Err(BusError::Unavailable(String::from("broker down")))
    }
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_user(persistence: &mut Persistence, phone: &str) -> OwnerSummary {
    persistence
        .create_user(
            phone,
            &OwnerProfile {
                first_name: Some(String::from("Omar")),
                last_name: Some(String::from("Nasser")),
                ..OwnerProfile::default()
            },
        )
        .expect("user created")
}

pub const fn admin() -> AuthenticatedCaller {
    AuthenticatedCaller::new(1000, Role::Admin)
}

pub const fn agent() -> AuthenticatedCaller {
    AuthenticatedCaller::new(2000, Role::Agent)
}

pub const fn customer(user_id: i64) -> AuthenticatedCaller {
    AuthenticatedCaller::new(user_id, Role::User)
}

pub fn booking_request(date: &str, time: &str) -> CreateReservationRequest {
    CreateReservationRequest {
        service_name: Some(String::from("Contract review")),
        date: Some(date.to_string()),
        time: Some(time.to_string()),
        notes: None,
    }
}

/// Books `date`/`time` for a fresh customer with the given phone.
pub fn book_as_customer(
    persistence: &mut Persistence,
    bus: &dyn NotificationBus,
    phone: &str,
    date: &str,
    time: &str,
) -> (AuthenticatedCaller, BookingSnapshot) {
    let owner: OwnerSummary = create_test_user(persistence, phone);
    let caller: AuthenticatedCaller = customer(owner.user_id);
    let snapshot: BookingSnapshot =
        create_reservation(persistence, bus, &caller, &booking_request(date, time))
            .expect("booking created");
    (caller, snapshot)
}
