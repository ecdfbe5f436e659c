// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use std::collections::BTreeMap;

use reserva::CoreError;
use reserva_domain::{DomainError, format_date, format_time};
use reserva_persistence::PersistenceError;
use time::{Date, Time};
use tracing::error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller could not be identified.
    Unauthenticated {
        /// The reason identification failed.
        reason: String,
    },
    /// The caller's role does not permit the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated { reason } => write!(f, "Authentication required: {reason}"),
            Self::Forbidden {
                action,
                required_role,
            } => {
                write!(f, "Forbidden: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent the
/// API contract. Every variant has a stable machine-readable [`kind`](Self::kind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed input, with per-field messages.
    ValidationError {
        /// Messages keyed by field name.
        fields: BTreeMap<String, Vec<String>>,
    },
    /// The requested slot already holds a reservation.
    SlotTaken {
        /// The requested date.
        date: Date,
        /// The requested start time.
        time: Time,
    },
    /// The requested date is an off day.
    OffDay {
        /// A human-readable description.
        message: String,
    },
    /// The requested slot lies outside working hours.
    OutsideWorkingHours {
        /// A human-readable description.
        message: String,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The reservation changed between read and write; the caller should
    /// reload it and retry.
    Conflict {
        /// The reservation that changed.
        reservation_id: i64,
    },
    /// The caller may not perform this action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The caller could not be identified.
    Unauthenticated {
        /// The reason identification failed.
        reason: String,
    },
    /// Storage or other internal failure. The message is for logs only.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// A validation error on a single field.
    #[must_use]
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            fields: BTreeMap::from([(field.to_string(), vec![message.into()])]),
        }
    }

    /// A `NotFound` for a reservation ID.
    #[must_use]
    pub fn reservation_not_found(reservation_id: i64) -> Self {
        Self::NotFound {
            resource_type: String::from("Reservation"),
            message: format!("Reservation {reservation_id} does not exist"),
        }
    }

    /// The stable machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "ValidationError",
            Self::SlotTaken { .. } => "SlotTaken",
            Self::OffDay { .. } => "OffDay",
            Self::OutsideWorkingHours { .. } => "OutsideWorkingHours",
            Self::NotFound { .. } => "NotFound",
            Self::Conflict { .. } => "Conflict",
            Self::Forbidden { .. } => "Forbidden",
            Self::Unauthenticated { .. } => "Unauthenticated",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Per-field messages, for validation errors only.
    #[must_use]
    pub const fn fields(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::ValidationError { fields } => Some(fields),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError { fields } => {
                let detail: Vec<String> = fields
                    .iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join("; ")))
                    .collect();
                write!(f, "Invalid input ({})", detail.join(", "))
            }
            Self::SlotTaken { date, time } => write!(
                f,
                "The slot {} {} is already booked",
                format_date(*date),
                format_time(*time)
            ),
            Self::OffDay { message } | Self::OutsideWorkingHours { message } => {
                write!(f, "{message}")
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { reservation_id } => write!(
                f,
                "Reservation {reservation_id} was changed by another request; reload and retry"
            ),
            Self::Forbidden {
                action,
                required_role,
            } => {
                write!(f, "Forbidden: '{action}' requires {required_role} role")
            }
            Self::Unauthenticated { reason } => write!(f, "Authentication required: {reason}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated { reason } => Self::Unauthenticated { reason },
            AuthError::Forbidden {
                action,
                required_role,
            } => Self::Forbidden {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::OffDay { .. } => ApiError::OffDay { message },
        DomainError::OutsideWorkingHours { .. } => ApiError::OutsideWorkingHours { message },
        DomainError::InvalidWorkingHour { field, .. } => ApiError::invalid(field, message),
        DomainError::EmptyWorkingWindow { .. } => ApiError::invalid("working_hours_end", message),
        DomainError::InvalidSlotDuration(_) => ApiError::invalid("slot_duration_minutes", message),
        DomainError::InvalidOffDay(_) => ApiError::invalid("off_days", message),
        DomainError::MisalignedSlot { .. } | DomainError::TimeParseError { .. } => {
            ApiError::invalid("time", message)
        }
        DomainError::DateParseError { .. } => ApiError::invalid("date", message),
        DomainError::InvalidServiceName(_) => ApiError::invalid("service_name", message),
        DomainError::InvalidPhone(_) => ApiError::invalid("phone", message),
        DomainError::InvalidStatus(_)
        | DomainError::InvalidStatusTransition { .. }
        | DomainError::TerminalReservation { .. } => ApiError::invalid("status", message),
        DomainError::InvalidCalendarMonth { .. } => ApiError::invalid("month", message),
        DomainError::InvalidTimezone(_) => ApiError::invalid("timezone", message),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Forbidden { action } => ApiError::Forbidden {
            action,
            required_role: String::from("admin"),
        },
        CoreError::NotVisible { reservation_id } => ApiError::reservation_not_found(reservation_id),
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::SlotConflict { date, time } => Self::SlotTaken { date, time },
            PersistenceError::NotFound(message) => Self::NotFound {
                resource_type: String::from("Record"),
                message,
            },
            PersistenceError::ReferenceNotFound(message) => Self::NotFound {
                resource_type: String::from("User"),
                message,
            },
            PersistenceError::StaleWrite { reservation_id } => Self::Conflict { reservation_id },
            other => {
                error!(error = %other, "Persistence failure");
                Self::Internal {
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserva_domain::ReservationStatus;
    use time::macros::{date, time};

    #[test]
    fn test_slot_conflict_becomes_slot_taken() {
        let err: ApiError = ApiError::from(PersistenceError::SlotConflict {
            date: date!(2025 - 11 - 03),
            time: time!(09:00),
        });
        assert_eq!(err.kind(), "SlotTaken");
        assert_eq!(err.to_string(), "The slot 2025-11-03 09:00 is already booked");
    }

    #[test]
    fn test_stale_write_becomes_conflict() {
        let err: ApiError = ApiError::from(PersistenceError::StaleWrite { reservation_id: 12 });
        assert_eq!(err.kind(), "Conflict");
        assert!(err.to_string().contains("Reservation 12"));
        assert!(err.fields().is_none());
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err: ApiError =
            ApiError::from(PersistenceError::DatabaseError(String::from("disk I/O error")));
        assert_eq!(err.kind(), "Internal");
    }

    #[test]
    fn test_policy_violations_keep_their_kind() {
        let off_day: ApiError = translate_domain_error(DomainError::OffDay {
            date: date!(2025 - 11 - 03),
        });
        assert_eq!(off_day.kind(), "OffDay");

        let outside: ApiError = translate_domain_error(DomainError::OutsideWorkingHours {
            time: time!(18:00),
            start_hour: 9,
            end_hour: 17,
        });
        assert_eq!(outside.kind(), "OutsideWorkingHours");
    }

    #[test]
    fn test_misaligned_slot_is_field_error_on_time() {
        let err: ApiError = translate_domain_error(DomainError::MisalignedSlot {
            time: time!(09:15),
            slot_duration_minutes: 60,
        });
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.fields().unwrap().contains_key("time"));
    }

    #[test]
    fn test_core_errors_translate() {
        assert_eq!(
            translate_core_error(CoreError::NotVisible { reservation_id: 5 }).kind(),
            "NotFound"
        );
        assert_eq!(
            translate_core_error(CoreError::Forbidden {
                action: String::from("delete reservations")
            })
            .kind(),
            "Forbidden"
        );
        let terminal: ApiError = translate_core_error(CoreError::DomainViolation(
            DomainError::TerminalReservation {
                status: ReservationStatus::Cancelled,
            },
        ));
        assert!(terminal.fields().unwrap().contains_key("status"));
    }
}
