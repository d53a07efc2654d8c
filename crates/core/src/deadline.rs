// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use std::time::{Duration, Instant};

/// A point in time after which an operation must give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    /// A deadline that never expires.
    #[must_use]
    pub const fn none() -> Self {
        Self { expires_at: None }
    }

    /// Time left before expiry. `None` means unbounded.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// # Errors
    ///
    /// Returns `CoreError::TimedOut` once the deadline has passed.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.is_expired() {
            Err(CoreError::TimedOut)
        } else {
            Ok(())
        }
    }
}
