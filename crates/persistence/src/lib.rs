// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Reserva.
//!
//! This crate stores the booking policy, the reservation ledger, and the
//! minimal user directory in `SQLite` through Diesel.
//!
//! ## Invariants Enforced by the Schema
//!
//! - At most one active booking policy (`idx_booking_policies_single_active`)
//! - At most one slot-holding reservation per `(date, time)`
//!   (`idx_reservations_active_slot`, partial over `upcoming`/`completed`)
//! - Every reservation references an existing user (foreign key)
//!
//! The uniqueness check and the write are a single statement, so two
//! concurrent bookings for the same slot can never both succeed; the loser
//! receives [`PersistenceError::SlotConflict`].
//!
//! ## Testing Philosophy
//!
//! - Tests run against isolated in-memory databases
//! - Concurrency tests use a temporary file shared by two connections

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::prelude::*;
use diesel::SqliteConnection;
use reserva::Transition;
use reserva_domain::{
    BookingEventKind, BookingPolicy, OwnerProfile, OwnerSummary, PolicySettings, Reservation,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, Time};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::MIGRATIONS;
pub use data_models::{ReservationFilter, ReservationPage, ReservationWithOwner};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// The outcome of writing a [`Transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTransition {
    /// The notification to publish, or `None` if nothing changed.
    pub event: Option<BookingEventKind>,
    /// The record after the write, or the last state before a delete.
    pub record: ReservationWithOwner,
}

/// Persistence adapter for the booking policy, ledger, and user directory.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so tests are
    /// isolated from one another.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    /// Runs `f` as one database transaction.
    ///
    /// Every write `f` makes through this handle commits together, or is
    /// rolled back together when `f` returns an error. Transactions opened
    /// by the methods `f` calls become savepoints of this one.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a persistence error if the transaction
    /// cannot be opened or committed.
    pub fn atomically<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<PersistenceError>,
    {
        AnsiTransactionManager::begin_transaction(&mut self.conn).map_err(PersistenceError::from)?;

        match f(self) {
            Ok(value) => {
                AnsiTransactionManager::commit_transaction(&mut self.conn)
                    .map_err(PersistenceError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = AnsiTransactionManager::rollback_transaction(&mut self.conn)
                {
                    tracing::error!(error = %rollback, "Failed to roll back transaction");
                }
                Err(e)
            }
        }
    }

    // ========================================================================
    // Policy Store
    // ========================================================================

    /// Returns the active policy.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no policy has ever been activated.
    pub fn get_active_policy(&mut self) -> Result<BookingPolicy, PersistenceError> {
        queries::policies::get_active_policy(&mut self.conn)?
            .ok_or_else(|| PersistenceError::NotFound(String::from("No active booking policy")))
    }

    /// Returns the active policy, activating the default one on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the seeding write fails.
    pub fn active_policy_or_default(&mut self) -> Result<BookingPolicy, PersistenceError> {
        self.conn
            .transaction::<BookingPolicy, PersistenceError, _>(|conn| {
                if let Some(policy) = queries::policies::get_active_policy(conn)? {
                    return Ok(policy);
                }
                tracing::info!("No booking policy found; activating defaults");
                let policy_id: i64 =
                    mutations::policies::activate_policy(conn, &PolicySettings::default())?;
                queries::policies::get_policy(conn, policy_id)
            })
    }

    /// Atomically makes `settings` the single active policy.
    ///
    /// The previously active policy, if any, is deactivated in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn activate_policy(
        &mut self,
        settings: &PolicySettings,
    ) -> Result<BookingPolicy, PersistenceError> {
        let policy_id: i64 = mutations::policies::activate_policy(&mut self.conn, settings)?;
        queries::policies::get_policy(&mut self.conn, policy_id)
    }

    /// Overwrites the parameters of an existing policy.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the policy does not exist.
    pub fn update_policy(
        &mut self,
        policy_id: i64,
        settings: &PolicySettings,
    ) -> Result<BookingPolicy, PersistenceError> {
        mutations::policies::update_policy(&mut self.conn, policy_id, settings)?;
        queries::policies::get_policy(&mut self.conn, policy_id)
    }

    // ========================================================================
    // User Directory
    // ========================================================================

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<OwnerSummary>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    /// Creates a user keyed by phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate phone).
    pub fn create_user(
        &mut self,
        phone: &str,
        profile: &OwnerProfile,
    ) -> Result<OwnerSummary, PersistenceError> {
        mutations::users::create_user(&mut self.conn, phone, profile)
    }

    /// Resolves a phone number to an account, creating it on first use.
    ///
    /// # Returns
    ///
    /// The account and whether it was created by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or insert fails.
    pub fn find_or_create_user(
        &mut self,
        phone: &str,
        profile: &OwnerProfile,
    ) -> Result<(OwnerSummary, bool), PersistenceError> {
        mutations::users::find_or_create_user(&mut self.conn, phone, profile)
    }

    // ========================================================================
    // Reservation Ledger
    // ========================================================================

    /// Writes a planned transition to the ledger.
    ///
    /// Inserts and updates return the record as written; deletes return the
    /// record as it was immediately before removal. Unchanged transitions
    /// write nothing and carry no event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::SlotConflict` if the write would double-book
    /// a slot, `PersistenceError::StaleWrite` if an update was planned from a
    /// row that has since changed, or another error if the write fails.
    /// Nothing is written on error.
    pub fn persist_transition(
        &mut self,
        transition: &Transition,
    ) -> Result<PersistedTransition, PersistenceError> {
        let event: Option<BookingEventKind> = transition.event_kind();

        let record: ReservationWithOwner = self
            .conn
            .transaction::<ReservationWithOwner, PersistenceError, _>(|conn| match transition {
                Transition::Insert(new_reservation) => {
                    let reservation_id: i64 =
                        mutations::reservations::insert_reservation(conn, new_reservation)?;
                    load_with_owner(conn, reservation_id)
                }
                Transition::Update {
                    reservation_id,
                    expected_status,
                    expected_updated_at,
                    changes,
                } => {
                    mutations::reservations::update_reservation(
                        conn,
                        *reservation_id,
                        *expected_status,
                        expected_updated_at,
                        changes,
                    )?;
                    load_with_owner(conn, *reservation_id)
                }
                Transition::Delete { reservation_id } => {
                    let snapshot: ReservationWithOwner = load_with_owner(conn, *reservation_id)?;
                    mutations::reservations::delete_reservation(conn, *reservation_id)?;
                    Ok(snapshot)
                }
                Transition::Unchanged(reservation) => {
                    load_with_owner(conn, reservation.reservation_id)
                }
            })?;

        Ok(PersistedTransition { event, record })
    }

    /// Retrieves a reservation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, PersistenceError> {
        queries::reservations::get_reservation(&mut self.conn, reservation_id)
    }

    /// Retrieves a reservation together with its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_reservation_with_owner(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<ReservationWithOwner>, PersistenceError> {
        queries::reservations::get_reservation_with_owner(&mut self.conn, reservation_id)
    }

    /// Lists reservations matching `filter`, newest booking first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_reservations(
        &mut self,
        filter: &ReservationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<ReservationPage, PersistenceError> {
        queries::reservations::list_reservations(&mut self.conn, filter, limit, offset)
    }

    /// Lists the most recently created reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn recent_reservations(
        &mut self,
        limit: i64,
    ) -> Result<Vec<ReservationWithOwner>, PersistenceError> {
        queries::reservations::recent_reservations(&mut self.conn, limit)
    }

    /// Start times of slot-holding reservations on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn booked_times_on(&mut self, date: Date) -> Result<BTreeSet<Time>, PersistenceError> {
        queries::reservations::booked_times_on(&mut self.conn, date)
    }

    /// Start times of slot-holding reservations per date in `[first, last]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn booked_times_between(
        &mut self,
        first: Date,
        last: Date,
    ) -> Result<BTreeMap<Date, BTreeSet<Time>>, PersistenceError> {
        queries::reservations::booked_times_between(&mut self.conn, first, last)
    }
}

fn load_with_owner(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<ReservationWithOwner, PersistenceError> {
    queries::reservations::get_reservation_with_owner(conn, reservation_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Reservation {reservation_id}")))
}
