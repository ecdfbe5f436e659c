// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::{OwnerSummary, Reservation, ReservationStatus};
use time::Date;

/// Listing criteria for the reservation ledger. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Exact booking date.
    pub date: Option<Date>,
    /// Case-insensitive substring of the service name.
    pub service_name: Option<String>,
    /// Exact status.
    pub status: Option<ReservationStatus>,
    /// Exact owner.
    pub owner_id: Option<i64>,
    /// Substring of the owner's phone number.
    pub phone: Option<String>,
}

/// A reservation joined with its owner's directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationWithOwner {
    /// The ledger record.
    pub reservation: Reservation,
    /// The owner summary.
    pub owner: OwnerSummary,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationPage {
    /// The records on this page, newest booking first.
    pub records: Vec<ReservationWithOwner>,
    /// How many records match the filter in total.
    pub total_count: i64,
}
