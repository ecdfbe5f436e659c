// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;
use reserva_domain::{format_date, format_time};
use time::{Date, Time};

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
    /// A slot-holding reservation already exists at this date and time.
    ///
    /// Raised by the storage layer's uniqueness constraint, never by a
    /// separate pre-check.
    SlotConflict {
        /// The contested date.
        date: Date,
        /// The contested slot start.
        time: Time,
    },
    /// A referenced row (such as the reservation owner) does not exist.
    ReferenceNotFound(String),
    /// The reservation changed after the write was planned.
    ///
    /// The stored status or `updated_at` no longer matches what the caller
    /// read, so the planned write was not applied.
    StaleWrite {
        /// The reservation whose write was refused.
        reservation_id: i64,
    },
    /// A stored value could not be converted back into a domain type.
    CorruptRow(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::SlotConflict { date, time } => write!(
                f,
                "The slot {} at {} is already booked",
                format_date(*date),
                format_time(*time)
            ),
            Self::ReferenceNotFound(msg) => write!(f, "Referenced record not found: {msg}"),
            Self::StaleWrite { reservation_id } => write!(
                f,
                "Reservation {reservation_id} was modified concurrently; reload and retry"
            ),
            Self::CorruptRow(msg) => write!(f, "Corrupt stored value: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ReferenceNotFound(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Maps a ledger write failure, turning a uniqueness violation into a slot conflict.
pub fn map_slot_write_error(
    err: diesel::result::Error,
    date: Date,
    time: Time,
) -> PersistenceError {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            PersistenceError::SlotConflict { date, time }
        }
        other => PersistenceError::from(other),
    }
}
