// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the Docket scheduling core.
//!
//! [`Persistence`] implements [`docket::UnitOfWork`]: every write runs inside
//! a `BEGIN IMMEDIATE` transaction, every read inside a deferred one, and
//! the repositories handed to the engines live only for that transaction.
//!
//! ## Constraints in the schema
//!
//! - `bookings_no_overlap_insert` / `bookings_no_overlap_update` triggers
//!   abort with `booking_overlap` when a blocking, non-empty range
//!   intersects another on the same lawyer and branch
//! - `UNIQUE (lawyer_id, queue_date, token_number)` and
//!   `UNIQUE (lawyer_id, queue_date, client_id)` on `queue_entries`
//!
//! Database errors are classified once, in [`PersistenceError`], and reach
//! the engines as [`docket::RepoError`].
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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

use diesel::{Connection, SqliteConnection};
use docket::{CoreError, Deadline, RepoError, Repositories, UnitOfWork};
use docket_domain::{Branch, CaseRef, ServicePackage, User};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod repos;

#[cfg(test)]
mod tests;

pub use backend::sqlite::DEFAULT_BUSY_TIMEOUT_MS;
pub use error::{OVERLAP_TRIGGER_MESSAGE, PersistenceError};
pub use repos::SqliteRepos;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Failure inside a transaction closure.
///
/// Engine errors pass through untouched; database errors are classified on
/// the way out.
enum TxError {
    Core(CoreError),
    Database(PersistenceError),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.into())
    }
}

impl TxError {
    fn into_core(self) -> CoreError {
        match self {
            Self::Core(err) => err,
            Self::Database(err) => CoreError::from(RepoError::from(err)),
        }
    }
}

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url = format!("file:docket_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

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
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    /// Sets how long statements wait on a locked database.
    ///
    /// # Errors
    ///
    /// Returns an error if the PRAGMA fails.
    pub fn set_busy_timeout(&mut self, millis: u64) -> Result<(), PersistenceError> {
        backend::sqlite::set_busy_timeout(&mut self.conn, millis)
    }

    /// Inserts or refreshes a user mirrored from the identity service.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub fn register_user(&mut self, user: &User) -> Result<(), PersistenceError> {
        mutations::directory::register_user(&mut self.conn, user)
    }

    /// Inserts or refreshes a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails or the owner is not registered.
    pub fn register_branch(&mut self, branch: &Branch) -> Result<(), PersistenceError> {
        mutations::directory::register_branch(&mut self.conn, branch)
    }

    /// Inserts or refreshes a case mirrored from the case service.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails or the client is not registered.
    pub fn register_case(&mut self, case: &CaseRef) -> Result<(), PersistenceError> {
        mutations::directory::register_case(&mut self.conn, case)
    }

    /// Inserts or refreshes a service package.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails or the lawyer is not registered.
    pub fn register_service_package(
        &mut self,
        package: &ServicePackage,
    ) -> Result<(), PersistenceError> {
        mutations::directory::register_service_package(&mut self.conn, package)
    }
}

/// Runs transaction work, turning a panic into an internal error so the
/// enclosing transaction rolls back and the connection stays usable.
fn run_contained<T>(work: impl FnOnce() -> Result<T, CoreError>) -> Result<T, CoreError> {
    catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        error!(panic = %message, "Transaction work panicked");
        Err(CoreError::Internal("operation aborted".to_string()))
    })
}

impl UnitOfWork for Persistence {
    fn write<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>,
    {
        deadline.check()?;
        let result = self.conn.immediate_transaction::<T, TxError, _>(|conn| {
            let mut repos = SqliteRepos::new(conn);
            let value = run_contained(|| work(&mut repos)).map_err(TxError::Core)?;
            // nothing is committed once the deadline has passed
            deadline.check().map_err(TxError::Core)?;
            Ok(value)
        });
        result.map_err(|err| {
            let err = err.into_core();
            debug!(code = %err.code(), "Write transaction rolled back");
            err
        })
    }

    fn read<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>,
    {
        deadline.check()?;
        let result = self.conn.transaction::<T, TxError, _>(|conn| {
            let mut repos = SqliteRepos::new(conn);
            run_contained(|| work(&mut repos)).map_err(TxError::Core)
        });
        result.map_err(|err| {
            let err = err.into_core();
            if matches!(err, CoreError::Internal(_)) {
                warn!(error = %err, "Read transaction failed");
            }
            err
        })
    }
}
