// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::{PolicySettings, Reservation, ReservationStatus};
use time::macros::{date, time};

pub const OWNER_ID: i64 = 7;
pub const OTHER_OWNER_ID: i64 = 8;
pub const RESERVATION_ID: i64 = 100;

/// 09:00-17:00, hourly slots, weekends off.
pub fn create_test_policy() -> PolicySettings {
    PolicySettings::new(9, 17, 60, &[5, 6]).unwrap()
}

/// An upcoming 10:00 reservation on Monday 2025-11-03.
pub fn create_test_reservation(status: ReservationStatus) -> Reservation {
    Reservation {
        reservation_id: RESERVATION_ID,
        owner_id: OWNER_ID,
        service_name: String::from("Consultation"),
        date: date!(2025 - 11 - 03),
        time: time!(10:00),
        duration_minutes: 60,
        status,
        notes: Some(String::from("first visit")),
        created_at: String::from("2025-11-01T08:00:00Z"),
        updated_at: String::from("2025-11-01T08:00:00Z"),
    }
}
