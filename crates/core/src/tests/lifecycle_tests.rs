// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    OWNER_ID, RESERVATION_ID, create_test_policy, create_test_reservation,
};
use crate::{Command, CoreError, ReservationPatch, Transition, apply};
use reserva_domain::{DomainError, OwnerScope, Reservation, ReservationChanges, ReservationStatus};
use time::macros::time;

fn cancel() -> Command {
    Command::CancelReservation {
        reservation_id: RESERVATION_ID,
    }
}

#[test]
fn test_cancel_upcoming_sets_cancelled() {
    let current: Reservation = create_test_reservation(ReservationStatus::Upcoming);
    let transition: Transition = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        cancel(),
    )
    .unwrap();

    assert_eq!(
        transition,
        Transition::Update {
            reservation_id: RESERVATION_ID,
            expected_status: current.status,
            expected_updated_at: current.updated_at.clone(),
            changes: ReservationChanges {
                status: Some(ReservationStatus::Cancelled),
                ..ReservationChanges::default()
            },
        }
    );
}

#[test]
fn test_recancel_is_idempotent() {
    let current: Reservation = create_test_reservation(ReservationStatus::Cancelled);
    let transition: Transition = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Owner(OWNER_ID),
        cancel(),
    )
    .unwrap();

    assert_eq!(transition, Transition::Unchanged(current));
    assert!(transition.event_kind().is_none());
}

#[test]
fn test_cancel_completed_rejected() {
    let current: Reservation = create_test_reservation(ReservationStatus::Completed);
    let result: Result<Transition, CoreError> =
        apply(&create_test_policy(), Some(&current), OwnerScope::Admin, cancel());

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidStatusTransition {
                from: ReservationStatus::Completed,
                to: ReservationStatus::Cancelled,
            }
        ))
    );
}

#[test]
fn test_cancelled_reservation_cannot_be_revived() {
    let current: Reservation = create_test_reservation(ReservationStatus::Cancelled);
    let result: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Admin,
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                status: Some(ReservationStatus::Upcoming),
                ..ReservationPatch::default()
            },
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::InvalidStatusTransition { .. }
        ))
    ));
}

#[test]
fn test_terminal_reservation_accepts_only_notes() {
    let current: Reservation = create_test_reservation(ReservationStatus::Completed);

    let moved: Result<Transition, CoreError> = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Admin,
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                time: Some(time!(11:00)),
                ..ReservationPatch::default()
            },
        },
    );
    assert_eq!(
        moved,
        Err(CoreError::DomainViolation(DomainError::TerminalReservation {
            status: ReservationStatus::Completed
        }))
    );

    let notes: Transition = apply(
        &create_test_policy(),
        Some(&current),
        OwnerScope::Admin,
        Command::UpdateReservation {
            reservation_id: RESERVATION_ID,
            patch: ReservationPatch {
                notes: Some(None),
                ..ReservationPatch::default()
            },
        },
    )
    .unwrap();
    assert_eq!(
        notes,
        Transition::Update {
            reservation_id: RESERVATION_ID,
            expected_status: current.status,
            expected_updated_at: current.updated_at.clone(),
            changes: ReservationChanges {
                notes: Some(None),
                ..ReservationChanges::default()
            },
        }
    );
}
