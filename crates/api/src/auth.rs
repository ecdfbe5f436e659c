// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity and role-based authorization.
//!
//! Callers are identified upstream of this crate. The API layer only decides
//! what an identified caller may do.

use std::str::FromStr;

use reserva_domain::OwnerScope;

use crate::error::AuthError;

/// Caller roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Back-office staff: sees and manages every reservation, changes
    /// booking settings, marks reservations completed, and hard-deletes.
    Admin,
    /// Call-centre staff: books on behalf of customers identified by phone.
    Agent,
    /// A customer: sees and manages only their own reservations.
    User,
}

impl Role {
    /// Converts this role to its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            "user" => Ok(Self::User),
            _ => Err(AuthError::Unauthenticated {
                reason: format!("Unknown role '{s}'. Must be admin, agent, or user"),
            }),
        }
    }
}

/// An identified caller with an associated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    /// The caller's user ID.
    pub user_id: i64,
    /// The caller's role.
    pub role: Role,
}

impl AuthenticatedCaller {
    /// Creates a new authenticated caller.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Which reservations this caller may see.
    ///
    /// Only admins see the whole ledger; agents and users see their own.
    #[must_use]
    pub const fn scope(&self) -> OwnerScope {
        match self.role {
            Role::Admin => OwnerScope::Admin,
            Role::Agent | Role::User => OwnerScope::Owner(self.user_id),
        }
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if a caller may change booking settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub fn authorize_manage_settings(caller: &AuthenticatedCaller) -> Result<(), AuthError> {
        Self::require_admin(caller, "change booking settings")
    }

    /// Checks if a caller may use the admin back-office operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub fn authorize_admin_bookings(caller: &AuthenticatedCaller) -> Result<(), AuthError> {
        Self::require_admin(caller, "manage bookings")
    }

    /// Checks if a caller may book on behalf of a customer by phone.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is neither an agent nor an admin.
    pub fn authorize_agent_booking(caller: &AuthenticatedCaller) -> Result<(), AuthError> {
        match caller.role {
            Role::Admin | Role::Agent => Ok(()),
            Role::User => Err(AuthError::Forbidden {
                action: String::from("book on behalf of a customer"),
                required_role: String::from("agent"),
            }),
        }
    }

    fn require_admin(caller: &AuthenticatedCaller, action: &str) -> Result<(), AuthError> {
        match caller.role {
            Role::Admin => Ok(()),
            Role::Agent | Role::User => Err(AuthError::Forbidden {
                action: action.to_string(),
                required_role: String::from("admin"),
            }),
        }
    }
}
