// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, ReservationPatch};
use crate::error::CoreError;
use crate::resolve_visible;
use crate::transition::Transition;
use reserva_domain::{
    DomainError, NewReservation, OwnerScope, PolicySettings, Reservation, ReservationChanges,
    ReservationStatus, normalize_notes, validate_requested_slot, validate_service_name,
};
use time::{Date, Time};

/// Applies a command to the current ledger view, producing the write to perform.
///
/// This function is pure. Every validation and policy check happens here, so
/// nothing partially applies: either a complete [`Transition`] is returned or
/// nothing is written. Slot conflicts are deliberately NOT checked; the
/// storage layer's uniqueness constraint is the only arbiter.
///
/// # Arguments
///
/// * `policy` - The active booking policy, read at the moment of the call
/// * `current` - The reservation the command targets (`None` for creates or
///   when no such reservation exists)
/// * `scope` - The caller's visibility scope
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(Transition)` describing the ledger write
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The requested slot is on an off day, outside working hours, or misaligned
/// - A field fails validation
/// - The reservation does not exist or is outside the caller's scope
/// - The caller's role does not permit the action
/// - The status change is not allowed
pub fn apply(
    policy: &PolicySettings,
    current: Option<&Reservation>,
    scope: OwnerScope,
    command: Command,
) -> Result<Transition, CoreError> {
    match command {
        Command::CreateReservation {
            owner_id,
            service_name,
            date,
            time,
            notes,
        } => {
            if !scope.permits(owner_id) {
                return Err(CoreError::Forbidden {
                    action: String::from("book on behalf of another user"),
                });
            }

            let service_name: String = validate_service_name(&service_name)?;
            validate_requested_slot(policy, date, time)?;

            Ok(Transition::Insert(NewReservation {
                owner_id,
                service_name,
                date,
                time,
                duration_minutes: policy.slot_duration_minutes(),
                notes: normalize_notes(notes.as_deref()),
            }))
        }
        Command::UpdateReservation {
            reservation_id,
            patch,
        } => {
            let current: &Reservation = resolve_visible(scope, reservation_id, current)?;
            let changes: ReservationChanges = plan_changes(policy, current, scope, patch)?;
            Ok(finish(current, changes))
        }
        Command::CancelReservation { reservation_id } => {
            let current: &Reservation = resolve_visible(scope, reservation_id, current)?;

            match current.status {
                // Re-cancelling is a no-op
                ReservationStatus::Cancelled => Ok(Transition::Unchanged(current.clone())),
                ReservationStatus::Completed => {
                    Err(CoreError::DomainViolation(DomainError::InvalidStatusTransition {
                        from: current.status,
                        to: ReservationStatus::Cancelled,
                    }))
                }
                ReservationStatus::Upcoming => Ok(Transition::Update {
                    reservation_id,
                    expected_status: current.status,
                    expected_updated_at: current.updated_at.clone(),
                    changes: ReservationChanges {
                        status: Some(ReservationStatus::Cancelled),
                        ..ReservationChanges::default()
                    },
                }),
            }
        }
        Command::DeleteReservation { reservation_id } => {
            if !scope.is_admin() {
                return Err(CoreError::Forbidden {
                    action: String::from("delete reservations"),
                });
            }
            resolve_visible(scope, reservation_id, current)?;
            Ok(Transition::Delete { reservation_id })
        }
    }
}

/// Turns a patch into the minimal set of column changes.
///
/// Fields equal to the current value are dropped so that a patch which
/// restates the record changes nothing.
fn plan_changes(
    policy: &PolicySettings,
    current: &Reservation,
    scope: OwnerScope,
    patch: ReservationPatch,
) -> Result<ReservationChanges, CoreError> {
    let mut changes: ReservationChanges = ReservationChanges::default();

    if let Some(status) = patch.status.filter(|s| *s != current.status) {
        if status == ReservationStatus::Completed && !scope.is_admin() {
            return Err(CoreError::Forbidden {
                action: String::from("mark reservations completed"),
            });
        }
        if !current.status.can_transition_to(status) {
            return Err(CoreError::DomainViolation(
                DomainError::InvalidStatusTransition {
                    from: current.status,
                    to: status,
                },
            ));
        }
        changes.status = Some(status);
    }

    if let Some(name) = patch.service_name {
        let name: String = validate_service_name(&name)?;
        if name != current.service_name {
            changes.service_name = Some(name);
        }
    }

    let date: Date = patch.date.unwrap_or(current.date);
    let time: Time = patch.time.unwrap_or(current.time);
    let moved: bool = date != current.date || time != current.time;

    // Rule: a terminal reservation only accepts note edits
    if current.status.is_terminal() && (changes.service_name.is_some() || moved) {
        return Err(CoreError::DomainViolation(
            DomainError::TerminalReservation {
                status: current.status,
            },
        ));
    }

    if moved {
        validate_requested_slot(policy, date, time)?;
        changes.date = Some(date);
        changes.time = Some(time);
        changes.duration_minutes = Some(policy.slot_duration_minutes());
    }

    if let Some(notes) = patch.notes {
        let notes: Option<String> = normalize_notes(notes.as_deref());
        if notes != current.notes {
            changes.notes = Some(notes);
        }
    }

    Ok(changes)
}

fn finish(current: &Reservation, changes: ReservationChanges) -> Transition {
    if changes.is_empty() {
        Transition::Unchanged(current.clone())
    } else {
        Transition::Update {
            reservation_id: current.reservation_id,
            expected_status: current.status,
            expected_updated_at: current.updated_at.clone(),
            changes,
        }
    }
}
