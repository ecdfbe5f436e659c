// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod user_tests;

use reserva::{Command, Transition, apply};
use reserva_domain::{OwnerProfile, OwnerScope, OwnerSummary, PolicySettings};
use time::macros::date;
use time::{Date, Time};

use crate::{PersistedTransition, Persistence, PersistenceError};

/// A Monday.
pub const MONDAY: Date = date!(2025 - 11 - 03);

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_user(persistence: &mut Persistence, phone: &str) -> OwnerSummary {
    persistence
        .create_user(
            phone,
            &OwnerProfile {
                first_name: Some(String::from("Sara")),
                last_name: Some(String::from("Haddad")),
                ..OwnerProfile::default()
            },
        )
        .expect("user created")
}

/// Plans and persists a create for `owner_id` at `date`/`time` under the default policy.
pub fn book(
    persistence: &mut Persistence,
    owner_id: i64,
    date: Date,
    time: Time,
) -> Result<PersistedTransition, PersistenceError> {
    let transition: Transition = apply(
        &PolicySettings::default(),
        None,
        OwnerScope::Admin,
        Command::CreateReservation {
            owner_id,
            service_name: String::from("Contract review"),
            date,
            time,
            notes: None,
        },
    )
    .expect("valid create command");
    persistence.persist_transition(&transition)
}

/// Plans and persists a cancel of `reservation_id` as an admin.
pub fn cancel(persistence: &mut Persistence, reservation_id: i64) -> PersistedTransition {
    let current = persistence
        .get_reservation(reservation_id)
        .unwrap()
        .expect("reservation exists");
    let transition: Transition = apply(
        &PolicySettings::default(),
        Some(&current),
        OwnerScope::Admin,
        Command::CancelReservation { reservation_id },
    )
    .expect("valid cancel command");
    persistence.persist_transition(&transition).unwrap()
}
