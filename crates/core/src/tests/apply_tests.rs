// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    OTHER_OWNER_ID, OWNER_ID, RESERVATION_ID, create_test_policy, create_test_reservation,
};
use crate::{Command, CoreError, ReservationPatch, Transition, apply};
use reserva_domain::{
    BookingEventKind, DomainError, NewReservation, OwnerScope, PolicySettings, Reservation,
    ReservationChanges, ReservationStatus,
};
use time::macros::{date, time};

fn create_command(date: time::Date, time: time::Time) -> Command {
    Command::CreateReservation {
        owner_id: OWNER_ID,
        service_name: String::from("  Consultation "),
        date,
        time,
        notes: Some(String::from("  ")),
    }
}

#[test]
fn test_create_produces_insert_with_policy_duration() {
    let policy: PolicySettings = PolicySettings::new(9, 17, 30, &[]).unwrap();
    let transition: Transition = apply(
        &policy,
        None,
        OwnerScope::Owner(OWNER_ID),
        create_command(date!(2025 - 11 - 03), time!(09:30)),
    )
    .unwrap();

    assert_eq!(
        transition,
        Transition::Insert(NewReservation {
            owner_id: OWNER_ID,
            service_name: String::from("Consultation"),
            date: date!(2025 - 11 - 03),
            time: time!(09:30),
            duration_minutes: 30,
            notes: None,
        })
    );
    assert_eq!(transition.event_kind(), Some(BookingEventKind::Created));
}

#[test]
fn test_create_on_off_day_rejected() {
    // 2025-11-08 is a Saturday
    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        None,
        OwnerScope::Owner(OWNER_ID),
        create_command(date!(2025 - 11 - 08), time!(10:00)),
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::OffDay {
            date: date!(2025 - 11 - 08)
        }))
    );
}

#[test]
fn test_create_outside_hours_rejected() {
    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        None,
        OwnerScope::Owner(OWNER_ID),
        create_command(date!(2025 - 11 - 03), time!(17:00)),
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::OutsideWorkingHours { .. }
        ))
    ));
}

#[test]
fn test_create_for_someone_else_forbidden_for_users() {
    let command: Command = Command::CreateReservation {
        owner_id: OTHER_OWNER_ID,
        service_name: String::from("Consultation"),
        date: date!(2025 - 11 - 03),
        time: time!(10:00),
        notes: None,
    };
    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        None,
        OwnerScope::Owner(OWNER_ID),
        command.clone(),
    );
    assert!(matches!(result, Err(CoreError::Forbidden { .. })));

    assert!(apply(&create_test_policy(), None, OwnerScope::Admin, command).is_ok());
}

#[test]
fn test_update_invisible_reservation_is_not_found() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OTHER_OWNER_ID),
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch::default(),
        },
    );
    assert_eq!(
        result,
        Err(CoreError::NotVisible {
            reservation_id: RESERVATION_ID
        })
    );

    let missing: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        None,
        OwnerScope::Admin,
        Command::CancelReservation {
            reservation_id: RESERVATION_ID,
        },
    );
    assert!(matches!(missing, Err(CoreError::NotVisible { .. })));
}

#[test]
fn test_moving_a_reservation_revalidates_and_sets_duration() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let policy: PolicySettings = PolicySettings::new(9, 17, 30, &[]).unwrap();

    let transition: Transition = apply(
        &policy,
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                time: Some(time!(14:30)),
                ..ReservationPatch::default()
            },
        },
    )
    .unwrap();

    assert_eq!(
        transition,
        Transition::Update {
            reservation_id: RESERVATION_ID,
            expected_status: current.status,
            expected_updated_at: current.updated_at.clone(),
            changes: ReservationChanges {
                date: Some(date!(2025 - 11 - 03)),
                time: Some(time!(14:30)),
                duration_minutes: Some(30),
                ..ReservationChanges::default()
            },
        }
    );

    let misaligned: Result<Transition, CoreError> = apply(
        &policy,
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                time: Some(time!(14:10)),
                ..ReservationPatch::default()
            },
        },
    );
    assert!(matches!(
        misaligned,
        Err(CoreError::DomainViolation(DomainError::MisalignedSlot { .. }))
    ));
}

#[test]
fn test_patch_restating_record_is_unchanged() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let transition: Transition = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                service_name: Some(String::from("Consultation")),
                date: Some(current.date),
                time: Some(current.time),
                status: Some(ReservationStatus::Upcoming),
                notes: Some(Some(String::from(" first visit "))),
            },
        },
    )
    .unwrap();

    assert_eq!(transition, Transition::Unchanged(current));
    assert_eq!(transition.event_kind(), None);
}

#[test]
fn test_users_cannot_mark_completed() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let patch: ReservationPatch = ReservationPatch {
        status: Some(ReservationStatus::Completed),
        ..ReservationPatch::default()
    };

    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: patch.clone(),
        },
    );
    assert!(matches!(result, Err(CoreError::Forbidden { .. })));

    let admin: Transition = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Admin,
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch,
        },
    )
    .unwrap();
    assert_eq!(admin.event_kind(), Some(BookingEventKind::Updated));
}

#[test]
fn test_delete_is_admin_only() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let command: Command = Command::DeleteReservation {
        reservation_id: RESERVATION_ID,
    };

    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        command.clone(),
    );
    assert!(matches!(result, Err(CoreError::Forbidden { .. })));

    let transition: Transition =
        apply(&create_test_policy(), Some(&current), OwnerScope::Admin, command).unwrap();
    assert_eq!(
        transition,
        Transition::Delete {
            reservation_id: RESERVATION_ID
        }
    );
    assert_eq!(transition.event_kind(), Some(BookingEventKind::Deleted));
}

#[test]
fn test_core_error_display() {
    let err: CoreError = CoreError::NotVisible { reservation_id: 5 };
    assert_eq!(err.to_string(), "Reservation 5 not found");

    let err: CoreError = CoreError::from(DomainError::InvalidServiceName(String::from("empty")));
    assert!(err.to_string().starts_with("Domain violation"));
}
