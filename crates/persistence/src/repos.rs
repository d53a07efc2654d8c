// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Storage ports over one open `SQLite` transaction.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use diesel::SqliteConnection;
use docket::{AvailabilityRepo, BookingRepo, DirectoryRepo, QueueRepo, RepoError};
use docket_domain::{
    AvailabilityException, BlackoutDay, Booking, BookingStatus, Branch, CaseRef,
    NewAvailabilityException, NewBlackoutDay, NewBooking, NewQueueEntry, NewWeeklyTemplate,
    QueueEntry, QueueStatus, ServicePackage, User, WeeklyAvailabilityTemplate,
};

use crate::error::PersistenceError;
use crate::{mutations, queries};

/// Repository view of a connection that is inside a transaction.
pub struct SqliteRepos<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteRepos<'c> {
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    fn reload_booking(&mut self, booking_id: i64) -> Result<Booking, RepoError> {
        queries::bookings::get_booking(self.conn, booking_id)?
            .ok_or_else(|| PersistenceError::not_found("booking", booking_id).into())
    }

    fn reload_template(&mut self, template_id: i64) -> Result<WeeklyAvailabilityTemplate, RepoError> {
        queries::availability::get_template(self.conn, template_id)?
            .ok_or_else(|| PersistenceError::not_found("template", template_id).into())
    }

    fn reload_entry(&mut self, entry_id: i64) -> Result<QueueEntry, RepoError> {
        queries::queue::get_entry(self.conn, entry_id)?
            .ok_or_else(|| PersistenceError::not_found("queue entry", entry_id).into())
    }
}

impl BookingRepo for SqliteRepos<'_> {
    fn insert_pending(&mut self, booking: &NewBooking) -> Result<Booking, RepoError> {
        let booking_id = mutations::bookings::insert_pending(self.conn, booking)?;
        self.reload_booking(booking_id)
    }

    fn list_active_for_lawyer_between(
        &mut self,
        lawyer_id: i64,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(queries::bookings::list_active_for_lawyer_between(
            self.conn, lawyer_id, utc_from, utc_to,
        )?)
    }

    fn list_for_lawyer_starting_between(
        &mut self,
        lawyer_id: i64,
        status: BookingStatus,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(queries::bookings::list_for_lawyer_starting_between(
            self.conn, lawyer_id, status, utc_from, utc_to,
        )?)
    }

    fn list_for_client(&mut self, client_id: i64) -> Result<Vec<Booking>, RepoError> {
        Ok(queries::bookings::list_for_client(self.conn, client_id)?)
    }

    fn list_for_lawyer(
        &mut self,
        lawyer_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(queries::bookings::list_for_lawyer(self.conn, lawyer_id, status)?)
    }

    fn get_booking(&mut self, id: i64) -> Result<Option<Booking>, RepoError> {
        Ok(queries::bookings::get_booking(self.conn, id)?)
    }

    fn update_status(
        &mut self,
        id: i64,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, RepoError> {
        mutations::bookings::update_status(self.conn, id, status, updated_at)?;
        self.reload_booking(id)
    }

    fn set_blocks_time(
        &mut self,
        id: i64,
        blocks_time: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        Ok(mutations::bookings::set_blocks_time(
            self.conn,
            id,
            blocks_time,
            updated_at,
        )?)
    }
}

impl AvailabilityRepo for SqliteRepos<'_> {
    fn list_templates(
        &mut self,
        lawyer_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(queries::availability::list_templates(self.conn, lawyer_id, weekday)?)
    }

    fn list_all_templates(
        &mut self,
        lawyer_id: i64,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(queries::availability::list_all_templates(self.conn, lawyer_id)?)
    }

    fn get_template(&mut self, id: i64) -> Result<Option<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(queries::availability::get_template(self.conn, id)?)
    }

    fn insert_template(
        &mut self,
        template: &NewWeeklyTemplate,
    ) -> Result<WeeklyAvailabilityTemplate, RepoError> {
        let template_id = mutations::availability::insert_template(self.conn, template)?;
        self.reload_template(template_id)
    }

    fn deactivate_template(&mut self, id: i64) -> Result<WeeklyAvailabilityTemplate, RepoError> {
        mutations::availability::deactivate_template(self.conn, id)?;
        self.reload_template(id)
    }

    fn list_exceptions(
        &mut self,
        lawyer_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, RepoError> {
        Ok(queries::availability::list_exceptions(self.conn, lawyer_id, date)?)
    }

    fn insert_exception(
        &mut self,
        exception: &NewAvailabilityException,
    ) -> Result<AvailabilityException, RepoError> {
        let exception_id = mutations::availability::insert_exception(self.conn, exception)?;
        Ok(AvailabilityException {
            id: exception_id,
            lawyer_id: exception.lawyer_id,
            template_id: exception.template_id,
            date: exception.date,
            override_start: exception.override_start,
            override_end: exception.override_end,
            override_max_bookings: exception.override_max_bookings,
            is_active: true,
        })
    }

    fn list_blackouts(
        &mut self,
        lawyer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BlackoutDay>, RepoError> {
        Ok(queries::availability::list_blackouts(self.conn, lawyer_id, from, to)?)
    }

    fn insert_blackout(&mut self, blackout: &NewBlackoutDay) -> Result<BlackoutDay, RepoError> {
        let blackout_id = mutations::availability::insert_blackout(self.conn, blackout)?;
        Ok(BlackoutDay {
            id: blackout_id,
            lawyer_id: blackout.lawyer_id,
            date: blackout.date,
            reason: blackout.reason.clone(),
        })
    }

    fn delete_blackout(&mut self, lawyer_id: i64, date: NaiveDate) -> Result<bool, RepoError> {
        Ok(mutations::availability::delete_blackout(self.conn, lawyer_id, date)?)
    }
}

impl QueueRepo for SqliteRepos<'_> {
    fn max_token_number(
        &mut self,
        lawyer_id: i64,
        date_local: NaiveDate,
    ) -> Result<u32, RepoError> {
        Ok(queries::queue::max_token_number(self.conn, lawyer_id, date_local)?)
    }

    fn insert_entry(&mut self, entry: &NewQueueEntry) -> Result<QueueEntry, RepoError> {
        let entry_id = mutations::queue::insert_entry(self.conn, entry)?;
        self.reload_entry(entry_id)
    }

    fn get_entry(&mut self, id: i64) -> Result<Option<QueueEntry>, RepoError> {
        Ok(queries::queue::get_entry(self.conn, id)?)
    }

    fn update_status_and_timestamps(
        &mut self,
        id: i64,
        status: QueueStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<QueueEntry, RepoError> {
        mutations::queue::update_status_and_timestamps(
            self.conn,
            id,
            status,
            started_at,
            completed_at,
            reason.as_deref(),
        )?;
        self.reload_entry(id)
    }

    fn list_for_day(
        &mut self,
        lawyer_id: i64,
        date_local: NaiveDate,
    ) -> Result<Vec<QueueEntry>, RepoError> {
        Ok(queries::queue::list_for_day(self.conn, lawyer_id, date_local)?)
    }
}

impl DirectoryRepo for SqliteRepos<'_> {
    fn get_user(&mut self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(queries::directory::get_user(self.conn, id)?)
    }

    fn get_branch(&mut self, id: i64) -> Result<Option<Branch>, RepoError> {
        Ok(queries::directory::get_branch(self.conn, id)?)
    }

    fn get_case(&mut self, id: i64) -> Result<Option<CaseRef>, RepoError> {
        Ok(queries::directory::get_case(self.conn, id)?)
    }

    fn get_service_package(&mut self, id: i64) -> Result<Option<ServicePackage>, RepoError> {
        Ok(queries::directory::get_service_package(self.conn, id)?)
    }
}
