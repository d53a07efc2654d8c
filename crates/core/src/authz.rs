// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization port.
//!
//! Engines ask an [`Authorizer`] whether a role holds a privilege before any
//! mutation. Ownership of the touched booking or queue entry is checked by
//! the engine itself.

use crate::error::CoreError;
use docket_domain::Role;
use serde::{Deserialize, Serialize};

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Privileges checked by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    BookingCreate,
    BookingConfirm,
    BookingReject,
    BookingCancel,
    BookingComplete,
    BookingRead,
    AvailabilityRead,
    AvailabilityManage,
    QueueGenerate,
    QueueRead,
    QueueUpdate,
}

impl Privilege {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCreate => "booking.create",
            Self::BookingConfirm => "booking.confirm",
            Self::BookingReject => "booking.reject",
            Self::BookingCancel => "booking.cancel",
            Self::BookingComplete => "booking.complete",
            Self::BookingRead => "booking.read",
            Self::AvailabilityRead => "availability.read",
            Self::AvailabilityManage => "availability.manage",
            Self::QueueGenerate => "queue.generate",
            Self::QueueRead => "queue.read",
            Self::QueueUpdate => "queue.update",
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role and privilege predicate.
pub trait Authorizer: Send + Sync {
    /// Returns true if `role` holds `privilege`.
    fn is_granted(&self, role: Role, privilege: Privilege) -> bool;

    /// Checks that the actor holds `privilege`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` if the privilege is not granted.
    fn authorize(&self, actor: &Actor, privilege: Privilege) -> Result<(), CoreError> {
        if self.is_granted(actor.role, privilege) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                action: privilege.as_str().to_string(),
                reason: format!("role {} lacks privilege {privilege}", actor.role),
            })
        }
    }
}

/// The built-in role table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl Authorizer for RolePolicy {
    fn is_granted(&self, role: Role, privilege: Privilege) -> bool {
        match role {
            Role::Client => matches!(
                privilege,
                Privilege::BookingCreate
                    | Privilege::BookingCancel
                    | Privilege::BookingRead
                    | Privilege::AvailabilityRead
            ),
            Role::Lawyer => matches!(
                privilege,
                Privilege::BookingConfirm
                    | Privilege::BookingReject
                    | Privilege::BookingComplete
                    | Privilege::BookingRead
                    | Privilege::AvailabilityRead
                    | Privilege::AvailabilityManage
                    | Privilege::QueueGenerate
                    | Privilege::QueueRead
                    | Privilege::QueueUpdate
            ),
            Role::Apprentice => {
                matches!(privilege, Privilege::AvailabilityRead | Privilege::QueueRead)
            }
            Role::Admin => matches!(
                privilege,
                Privilege::BookingRead | Privilege::AvailabilityRead | Privilege::QueueRead
            ),
        }
    }
}
