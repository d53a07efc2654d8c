// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller authentication.
//!
//! Identity and credentials belong to an external collaborator. This layer
//! receives the caller's user id, resolves it against the directory and
//! fixes the caller's [`Role`](docket_domain::Role) for the rest of the request.

use docket::{Actor, Deadline, UnitOfWork};
use docket_domain::User;
use tracing::{debug, warn};

use crate::error::{ApiError, translate_core_error};

/// Resolves caller ids into actors.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Parses the raw caller id presented by the transport.
    ///
    /// # Arguments
    ///
    /// * `raw` - The caller id as received, e.g. from a request header
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the value is missing or not a
    /// positive integer.
    pub fn parse_actor_id(raw: Option<&str>) -> Result<i64, ApiError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
            ApiError::AuthenticationFailed {
                reason: String::from("Missing caller id"),
            }
        })?;
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ApiError::AuthenticationFailed {
                reason: format!("Invalid caller id: {raw}"),
            }),
        }
    }

    /// Looks up a caller and returns the actor the engines act for.
    ///
    /// # Arguments
    ///
    /// * `uow` - The store
    /// * `deadline` - The request deadline
    /// * `actor_id` - The caller's user id
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` for an unknown user, or the translated
    /// store error if the lookup itself fails.
    pub fn authenticate<U: UnitOfWork>(
        uow: &mut U,
        deadline: Deadline,
        actor_id: i64,
    ) -> Result<Actor, ApiError> {
        let user: Option<User> = uow
            .read(deadline, |repos| Ok(repos.get_user(actor_id)?))
            .map_err(translate_core_error)?;

        let Some(user) = user else {
            warn!(actor_id, "Authentication failed: unknown user");
            return Err(ApiError::AuthenticationFailed {
                reason: format!("Unknown user: {actor_id}"),
            });
        };

        debug!(actor_id, role = user.role.as_str(), "Authenticated caller");
        Ok(Actor::new(user.id, user.role))
    }
}
