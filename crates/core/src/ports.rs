// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage ports.
//!
//! Each repository is a narrow capability over a transactional store.
//! Engines never hold a repository directly; they receive one from a
//! [`UnitOfWork`] for the duration of a single transaction.
//!
//! Implementations must enforce two constraints in the store itself:
//!
//! - active bookings (`blocks_time`, non-empty range) on the same lawyer and
//!   branch never intersect, reported as [`RepoError::OverlapViolation`]
//! - `(lawyer, date_local, token_number)` is unique, reported as
//!   [`RepoError::TokenConflict`]

use crate::deadline::Deadline;
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use docket_domain::{
    AvailabilityException, BlackoutDay, Booking, BookingStatus, Branch, CaseRef,
    NewAvailabilityException, NewBlackoutDay, NewBooking, NewQueueEntry, NewWeeklyTemplate,
    QueueEntry, QueueStatus, ServicePackage, User, WeeklyAvailabilityTemplate,
};

/// Store failures, classified once at the repository boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// The range-exclusion constraint on active bookings fired.
    OverlapViolation,
    /// The token-number uniqueness constraint fired.
    TokenConflict,
    /// A row that must exist was missing.
    NotFound {
        /// The kind of entity.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
    /// The store could not acquire its lock in time.
    Busy,
    /// Any other store failure.
    Backend(String),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverlapViolation => write!(f, "booking overlap constraint violated"),
            Self::TokenConflict => write!(f, "token number uniqueness violated"),
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::Busy => write!(f, "store is busy"),
            Self::Backend(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for RepoError {}

pub trait BookingRepo {
    /// Inserts a booking with status `pending` and `blocks_time = true`.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::OverlapViolation` if the exclusion constraint fires.
    fn insert_pending(&mut self, booking: &NewBooking) -> Result<Booking, RepoError>;

    /// Lists blocking bookings of a lawyer whose range intersects `[utc_from, utc_to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_active_for_lawyer_between(
        &mut self,
        lawyer_id: i64,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError>;

    /// Lists bookings of a lawyer in `status` that start in `[utc_from, utc_to)`,
    /// ordered by start then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_for_lawyer_starting_between(
        &mut self,
        lawyer_id: i64,
        status: BookingStatus,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_for_client(&mut self, client_id: i64) -> Result<Vec<Booking>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_for_lawyer(
        &mut self,
        lawyer_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_booking(&mut self, id: i64) -> Result<Option<Booking>, RepoError>;

    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the booking does not exist.
    fn update_status(
        &mut self,
        id: i64,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, RepoError>;

    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the booking does not exist.
    fn set_blocks_time(
        &mut self,
        id: i64,
        blocks_time: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}

pub trait AvailabilityRepo {
    /// Lists the lawyer's active templates for a weekday.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_templates(
        &mut self,
        lawyer_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError>;

    /// Lists every template of the lawyer, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_all_templates(
        &mut self,
        lawyer_id: i64,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_template(&mut self, id: i64) -> Result<Option<WeeklyAvailabilityTemplate>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_template(
        &mut self,
        template: &NewWeeklyTemplate,
    ) -> Result<WeeklyAvailabilityTemplate, RepoError>;

    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the template does not exist.
    fn deactivate_template(&mut self, id: i64) -> Result<WeeklyAvailabilityTemplate, RepoError>;

    /// Lists the lawyer's active exceptions on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_exceptions(
        &mut self,
        lawyer_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_exception(
        &mut self,
        exception: &NewAvailabilityException,
    ) -> Result<AvailabilityException, RepoError>;

    /// Lists blackout days with `from <= date <= to`, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_blackouts(
        &mut self,
        lawyer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BlackoutDay>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn insert_blackout(&mut self, blackout: &NewBlackoutDay) -> Result<BlackoutDay, RepoError>;

    /// Removes a blackout day. Returns false if none existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn delete_blackout(&mut self, lawyer_id: i64, date: NaiveDate) -> Result<bool, RepoError>;
}

pub trait QueueRepo {
    /// Returns the highest token number issued for the day, or 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn max_token_number(&mut self, lawyer_id: i64, date_local: NaiveDate)
    -> Result<u32, RepoError>;

    /// # Errors
    ///
    /// Returns `RepoError::TokenConflict` if the token number is already taken.
    fn insert_entry(&mut self, entry: &NewQueueEntry) -> Result<QueueEntry, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_entry(&mut self, id: i64) -> Result<Option<QueueEntry>, RepoError>;

    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the entry does not exist.
    fn update_status_and_timestamps(
        &mut self,
        id: i64,
        status: QueueStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<QueueEntry, RepoError>;

    /// Lists the day's entries ordered by token number.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_for_day(
        &mut self,
        lawyer_id: i64,
        date_local: NaiveDate,
    ) -> Result<Vec<QueueEntry>, RepoError>;
}

/// Read access to rows owned by collaborators outside the core.
pub trait DirectoryRepo {
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_user(&mut self, id: i64) -> Result<Option<User>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_branch(&mut self, id: i64) -> Result<Option<Branch>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_case(&mut self, id: i64) -> Result<Option<CaseRef>, RepoError>;

    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn get_service_package(&mut self, id: i64) -> Result<Option<ServicePackage>, RepoError>;
}

/// Every repository available inside one transaction.
pub trait Repositories: BookingRepo + AvailabilityRepo + QueueRepo + DirectoryRepo {}

impl<T> Repositories for T where T: BookingRepo + AvailabilityRepo + QueueRepo + DirectoryRepo {}

/// Scoped transactions over the store.
///
/// `work` runs inside one transaction. The transaction commits only when
/// `work` returns `Ok` and the deadline has not passed; otherwise it is
/// rolled back and nothing it did is visible.
pub trait UnitOfWork {
    /// Runs `work` in a serializable write transaction.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, `CoreError::TimedOut` when the deadline
    /// passes, or a classified store error.
    fn write<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>;

    /// Runs `work` in a read transaction.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, `CoreError::TimedOut` when the deadline
    /// passes, or a classified store error.
    fn read<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>;
}

