// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;
use std::str::FromStr;

use time::macros::{date, time};

use crate::{
    BookingEventKind, DomainError, OwnerScope, PolicySettings, PolicyUpdate, Reservation,
    ReservationChanges, ReservationStatus,
};

#[test]
fn test_default_policy() {
    let policy: PolicySettings = PolicySettings::default();
    assert_eq!(policy.working_hours_start(), 9);
    assert_eq!(policy.working_hours_end(), 17);
    assert_eq!(policy.slot_duration_minutes(), 60);
    assert!(policy.off_days().is_empty());
}

#[test]
fn test_policy_accepts_boundaries() {
    let policy: PolicySettings = PolicySettings::new(0, 23, 1440, &[0, 6]).unwrap();
    assert_eq!(policy.window_start_minute(), 0);
    assert_eq!(policy.window_end_minute(), 23 * 60);
    assert_eq!(policy.off_days(), &BTreeSet::from([0, 6]));
}

#[test]
fn test_policy_rejects_out_of_range_hours() {
    assert_eq!(
        PolicySettings::new(-1, 17, 60, &[]),
        Err(DomainError::InvalidWorkingHour {
            field: "working_hours_start",
            value: -1,
        })
    );
    assert_eq!(
        PolicySettings::new(9, 24, 60, &[]),
        Err(DomainError::InvalidWorkingHour {
            field: "working_hours_end",
            value: 24,
        })
    );
}

#[test]
fn test_policy_rejects_empty_window() {
    assert_eq!(
        PolicySettings::new(17, 9, 60, &[]),
        Err(DomainError::EmptyWorkingWindow { start: 17, end: 9 })
    );
    assert_eq!(
        PolicySettings::new(9, 9, 60, &[]),
        Err(DomainError::EmptyWorkingWindow { start: 9, end: 9 })
    );
}

#[test]
fn test_policy_rejects_bad_duration_and_off_days() {
    assert_eq!(
        PolicySettings::new(9, 17, 0, &[]),
        Err(DomainError::InvalidSlotDuration(0))
    );
    assert_eq!(
        PolicySettings::new(9, 17, 1441, &[]),
        Err(DomainError::InvalidSlotDuration(1441))
    );
    assert_eq!(
        PolicySettings::new(9, 17, 60, &[7]),
        Err(DomainError::InvalidOffDay(7))
    );
    assert_eq!(
        PolicySettings::new(9, 17, 60, &[-1]),
        Err(DomainError::InvalidOffDay(-1))
    );
}

#[test]
fn test_duplicate_off_days_collapse() {
    let policy: PolicySettings = PolicySettings::new(9, 17, 60, &[4, 4, 5]).unwrap();
    assert_eq!(policy.off_days().len(), 2);
}

#[test]
fn test_is_off_day_uses_monday_zero() {
    // Friday = 4
    let policy: PolicySettings = PolicySettings::new(9, 17, 60, &[4]).unwrap();
    assert!(policy.is_off_day(date!(2025 - 11 - 07)));
    assert!(!policy.is_off_day(date!(2025 - 11 - 03)));
}

#[test]
fn test_policy_update_merges_and_revalidates() {
    let current: PolicySettings = PolicySettings::default();

    let update: PolicyUpdate = PolicyUpdate {
        slot_duration_minutes: Some(30),
        ..PolicyUpdate::default()
    };
    let merged: PolicySettings = update.apply_to(&current).unwrap();
    assert_eq!(merged.slot_duration_minutes(), 30);
    assert_eq!(merged.working_hours_start(), 9);

    let bad: PolicyUpdate = PolicyUpdate {
        working_hours_start: Some(18),
        ..PolicyUpdate::default()
    };
    assert_eq!(
        bad.apply_to(&current),
        Err(DomainError::EmptyWorkingWindow { start: 18, end: 17 })
    );

    assert!(PolicyUpdate::default().is_empty());
    assert!(!update.is_empty());
}

#[test]
fn test_status_parsing() {
    assert_eq!(
        ReservationStatus::from_str(" Upcoming ").unwrap(),
        ReservationStatus::Upcoming
    );
    assert_eq!(
        ReservationStatus::from_str("CANCELLED").unwrap(),
        ReservationStatus::Cancelled
    );
    assert!(matches!(
        ReservationStatus::from_str("pending"),
        Err(DomainError::InvalidStatus(_))
    ));
}

#[test]
fn test_status_machine() {
    use ReservationStatus::{Cancelled, Completed, Upcoming};

    assert!(Upcoming.can_transition_to(Cancelled));
    assert!(Upcoming.can_transition_to(Completed));
    assert!(!Cancelled.can_transition_to(Upcoming));
    assert!(!Completed.can_transition_to(Cancelled));
    assert!(!Upcoming.can_transition_to(Upcoming));

    assert!(Upcoming.occupies_slot());
    assert!(Completed.occupies_slot());
    assert!(!Cancelled.occupies_slot());

    assert!(!Upcoming.is_terminal());
    assert!(Cancelled.is_terminal());
}

#[test]
fn test_reservation_end_time() {
    let reservation: Reservation = Reservation {
        reservation_id: 1,
        owner_id: 7,
        service_name: String::from("Consultation"),
        date: date!(2025 - 11 - 03),
        time: time!(16:30),
        duration_minutes: 45,
        status: ReservationStatus::Upcoming,
        notes: None,
        created_at: String::new(),
        updated_at: String::new(),
    };
    assert_eq!(reservation.end_time(), time!(17:15));
}

#[test]
fn test_owner_scope() {
    assert!(OwnerScope::Admin.permits(42));
    assert!(OwnerScope::Owner(42).permits(42));
    assert!(!OwnerScope::Owner(41).permits(42));
    assert!(OwnerScope::Admin.is_admin());
}

#[test]
fn test_empty_changes() {
    assert!(ReservationChanges::default().is_empty());
    let changes: ReservationChanges = ReservationChanges {
        notes: Some(None),
        ..ReservationChanges::default()
    };
    assert!(!changes.is_empty());
}

#[test]
fn test_event_message_types() {
    assert_eq!(BookingEventKind::Created.message_type(), "booking_created");
    assert_eq!(BookingEventKind::Updated.message_type(), "booking_updated");
    assert_eq!(BookingEventKind::Deleted.message_type(), "booking_deleted");
}
