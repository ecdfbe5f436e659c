// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::DomainError;

/// Errors that can occur while planning a ledger transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The caller's role does not allow this action.
    Forbidden {
        /// The attempted action, in words.
        action: String,
    },
    /// The reservation does not exist or is outside the caller's scope.
    NotVisible {
        /// The requested reservation.
        reservation_id: i64,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Forbidden { action } => write!(f, "Not permitted to {action}"),
            Self::NotVisible { reservation_id } => {
                write!(f, "Reservation {reservation_id} not found")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
