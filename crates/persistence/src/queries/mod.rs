// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `policies` - Active booking policy lookups
//! - `reservations` - Ledger lookups, listings, and slot occupancy
//! - `users` - User directory lookups

pub mod policies;
pub mod reservations;
pub mod users;
