// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::authz::{Actor, Authorizer, Privilege};
use crate::config::SchedulingConfig;
use crate::deadline::Deadline;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use docket_domain::CivilTimezone;

/// Everything an engine operation needs besides the store and the caller.
#[derive(Clone, Copy)]
pub struct OperationContext<'a> {
    pub config: &'a SchedulingConfig,
    pub authorizer: &'a dyn Authorizer,
    /// The instant the request is evaluated at.
    pub now: DateTime<Utc>,
    pub deadline: Deadline,
}

impl<'a> OperationContext<'a> {
    #[must_use]
    pub const fn new(
        config: &'a SchedulingConfig,
        authorizer: &'a dyn Authorizer,
        now: DateTime<Utc>,
        deadline: Deadline,
    ) -> Self {
        Self {
            config,
            authorizer,
            now,
            deadline,
        }
    }

    #[must_use]
    pub const fn tz(&self) -> &CivilTimezone {
        &self.config.civil_timezone
    }

    pub(crate) fn require(&self, actor: &Actor, privilege: Privilege) -> Result<(), CoreError> {
        self.authorizer.authorize(actor, privilege)
    }
}

impl std::fmt::Debug for OperationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationContext")
            .field("config", self.config)
            .field("now", &self.now)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
