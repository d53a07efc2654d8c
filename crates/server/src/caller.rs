// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller extraction for the server.
//!
//! The identity collaborator in front of this service authenticates the
//! user and forwards their id in the `X-Actor-Id` header. This extractor
//! resolves that id into an [`Actor`] and starts the request deadline.

use axum::{extract::FromRequestParts, http::request::Parts};
use docket::{Actor, Deadline};
use docket_api::AuthenticationService;
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// Header carrying the caller's user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// An authenticated caller and the deadline of the current request.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     AxumState(app_state): AxumState<AppState>,
///     caller: Caller,
/// ) -> Result<Json<Response>, HttpError> {
///     let ctx = app_state.context(caller.deadline);
///     ...
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing, malformed, or names an
/// unknown user.
pub struct Caller {
    pub actor: Actor,
    pub deadline: Deadline,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let deadline = Deadline::after(state.config.request_timeout);

        let raw = match parts.headers.get(ACTOR_ID_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                warn!("Invalid X-Actor-Id header encoding");
                HttpError::unauthenticated("Invalid X-Actor-Id header encoding")
            })?),
            None => None,
        };
        let actor_id = AuthenticationService::parse_actor_id(raw)?;

        let mut persistence = state.lock_store(deadline).await?;
        let actor = AuthenticationService::authenticate(&mut *persistence, deadline, actor_id)?;

        debug!(
            actor_id = actor.user_id,
            role = actor.role.as_str(),
            "Caller authenticated"
        );
        Ok(Self { actor, deadline })
    }
}
