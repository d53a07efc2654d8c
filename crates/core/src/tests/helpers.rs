// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory implementation of the storage ports.
//!
//! `write` runs against a copy of the state and swaps it in only on success,
//! which gives the same all-or-nothing behaviour as a SQL transaction. The
//! overlap and token constraints are enforced like the SQL schema does.

use crate::{
    Actor, AvailabilityRepo, BookingRepo, CoreError, Deadline, DirectoryRepo, OperationContext,
    QueueRepo, RepoError, Repositories, RolePolicy, SchedulingConfig, UnitOfWork,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use docket_domain::{
    AvailabilityException, BlackoutDay, Booking, BookingStatus, Branch, CaseRef,
    NewAvailabilityException, NewBlackoutDay, NewBooking, NewQueueEntry, NewWeeklyTemplate,
    QueueEntry, QueueStatus, Role, ServicePackage, User, WeeklyAvailabilityTemplate,
};

pub const LAWYER: i64 = 10;
pub const OTHER_LAWYER: i64 = 11;
pub const CLIENT_C: i64 = 20;
pub const CLIENT_D: i64 = 21;
pub const CLIENT_E: i64 = 22;
pub const APPRENTICE: i64 = 30;
pub const CASE_C: i64 = 200;
pub const CASE_D: i64 = 201;
pub const CASE_E: i64 = 202;
pub const PACKAGE_30: i64 = 300;
pub const BRANCH: i64 = 400;
pub const SECOND_BRANCH: i64 = 401;

pub static POLICY: RolePolicy = RolePolicy;

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    users: Vec<User>,
    branches: Vec<Branch>,
    cases: Vec<CaseRef>,
    packages: Vec<ServicePackage>,
    templates: Vec<WeeklyAvailabilityTemplate>,
    exceptions: Vec<AvailabilityException>,
    blackouts: Vec<BlackoutDay>,
    bookings: Vec<Booking>,
    queue: Vec<QueueEntry>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A transaction-scoped view of the store.
pub struct Tx<'a> {
    state: StoreState,
    injected_token_conflicts: &'a mut u32,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub state: StoreState,
    /// Number of upcoming queue inserts that fail with a token conflict.
    pub injected_token_conflicts: u32,
    pub committed_writes: u32,
}

impl InMemoryStore {
    pub fn bookings(&self) -> &[Booking] {
        &self.state.bookings
    }

    pub fn queue(&self) -> &[QueueEntry] {
        &self.state.queue
    }

    pub fn add_user(&mut self, id: i64, role: Role) {
        self.state.users.push(User {
            id,
            role,
            display_name: format!("user {id}"),
        });
    }

    pub fn add_branch(&mut self, id: i64, owner_lawyer_id: i64) {
        self.state.branches.push(Branch {
            id,
            owner_lawyer_id,
            name: format!("branch {id}"),
        });
    }

    pub fn add_case(&mut self, id: i64, client_id: i64) {
        self.state.cases.push(CaseRef { id, client_id });
    }

    pub fn add_package(&mut self, id: i64, lawyer_id: i64, duration_minutes: u32) {
        self.state.packages.push(ServicePackage {
            id,
            lawyer_id,
            name: format!("{duration_minutes} minute consultation"),
            duration_minutes,
            active: true,
        });
    }

    pub fn add_template(
        &mut self,
        lawyer_id: i64,
        branch_id: Option<i64>,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> i64 {
        let id = self.state.next_id();
        self.state.templates.push(WeeklyAvailabilityTemplate {
            id,
            lawyer_id,
            branch_id,
            weekday,
            start_local_time: start,
            end_local_time: end,
            slot_minutes: 15,
            max_bookings: 1,
            is_active: true,
        });
        id
    }

    pub fn add_blackout(&mut self, lawyer_id: i64, date: NaiveDate) {
        let id = self.state.next_id();
        self.state.blackouts.push(BlackoutDay {
            id,
            lawyer_id,
            date,
            reason: None,
        });
    }
}

impl UnitOfWork for InMemoryStore {
    fn write<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>,
    {
        deadline.check()?;
        let mut tx = Tx {
            state: self.state.clone(),
            injected_token_conflicts: &mut self.injected_token_conflicts,
        };
        let value = work(&mut tx)?;
        deadline.check()?;
        let Tx { state, .. } = tx;
        self.state = state;
        self.committed_writes += 1;
        Ok(value)
    }

    fn read<T, F>(&mut self, deadline: Deadline, work: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T, CoreError>,
    {
        deadline.check()?;
        let mut tx = Tx {
            state: self.state.clone(),
            injected_token_conflicts: &mut self.injected_token_conflicts,
        };
        work(&mut tx)
    }
}

fn missing(entity: &'static str, id: i64) -> RepoError {
    RepoError::NotFound {
        entity,
        id: id.to_string(),
    }
}

impl BookingRepo for Tx<'_> {
    fn insert_pending(&mut self, booking: &NewBooking) -> Result<Booking, RepoError> {
        let range = booking.range();
        if !range.is_empty()
            && self.state.bookings.iter().any(|b| {
                b.lawyer_id == booking.lawyer_id
                    && b.branch_id == booking.branch_id
                    && b.is_blocking()
                    && b.range().overlaps(&range)
            })
        {
            return Err(RepoError::OverlapViolation);
        }
        let stored = Booking {
            id: self.state.next_id(),
            client_id: booking.client_id,
            lawyer_id: booking.lawyer_id,
            branch_id: booking.branch_id,
            case_id: booking.case_id,
            service_package_id: booking.service_package_id,
            scheduled_at_utc: booking.scheduled_at_utc,
            ends_at_utc: booking.ends_at_utc,
            status: BookingStatus::Pending,
            blocks_time: true,
            note: booking.note.clone(),
            created_at: booking.created_at,
            updated_at: booking.created_at,
        };
        self.state.bookings.push(stored.clone());
        Ok(stored)
    }

    fn list_active_for_lawyer_between(
        &mut self,
        lawyer_id: i64,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .state
            .bookings
            .iter()
            .filter(|b| {
                b.lawyer_id == lawyer_id
                    && b.is_blocking()
                    && b.scheduled_at_utc < utc_to
                    && utc_from < b.ends_at_utc
            })
            .cloned()
            .collect())
    }

    fn list_for_lawyer_starting_between(
        &mut self,
        lawyer_id: i64,
        status: BookingStatus,
        utc_from: DateTime<Utc>,
        utc_to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, RepoError> {
        let mut found: Vec<Booking> = self
            .state
            .bookings
            .iter()
            .filter(|b| {
                b.lawyer_id == lawyer_id
                    && b.status == status
                    && utc_from <= b.scheduled_at_utc
                    && b.scheduled_at_utc < utc_to
            })
            .cloned()
            .collect();
        found.sort_by_key(|b| (b.scheduled_at_utc, b.id));
        Ok(found)
    }

    fn list_for_client(&mut self, client_id: i64) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .state
            .bookings
            .iter()
            .filter(|b| b.client_id == client_id)
            .cloned()
            .collect())
    }

    fn list_for_lawyer(
        &mut self,
        lawyer_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .state
            .bookings
            .iter()
            .filter(|b| b.lawyer_id == lawyer_id && status.is_none_or(|s| b.status == s))
            .cloned()
            .collect())
    }

    fn get_booking(&mut self, id: i64) -> Result<Option<Booking>, RepoError> {
        Ok(self.state.bookings.iter().find(|b| b.id == id).cloned())
    }

    fn update_status(
        &mut self,
        id: i64,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, RepoError> {
        let booking = self
            .state
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| missing("booking", id))?;
        booking.status = status;
        booking.updated_at = updated_at;
        Ok(booking.clone())
    }

    fn set_blocks_time(
        &mut self,
        id: i64,
        blocks_time: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let booking = self
            .state
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| missing("booking", id))?;
        booking.blocks_time = blocks_time;
        booking.updated_at = updated_at;
        Ok(())
    }
}

impl AvailabilityRepo for Tx<'_> {
    fn list_templates(
        &mut self,
        lawyer_id: i64,
        weekday: Weekday,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(self
            .state
            .templates
            .iter()
            .filter(|t| t.lawyer_id == lawyer_id && t.weekday == weekday && t.is_active)
            .cloned()
            .collect())
    }

    fn list_all_templates(
        &mut self,
        lawyer_id: i64,
    ) -> Result<Vec<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(self
            .state
            .templates
            .iter()
            .filter(|t| t.lawyer_id == lawyer_id)
            .cloned()
            .collect())
    }

    fn get_template(&mut self, id: i64) -> Result<Option<WeeklyAvailabilityTemplate>, RepoError> {
        Ok(self.state.templates.iter().find(|t| t.id == id).cloned())
    }

    fn insert_template(
        &mut self,
        template: &NewWeeklyTemplate,
    ) -> Result<WeeklyAvailabilityTemplate, RepoError> {
        let stored = WeeklyAvailabilityTemplate {
            id: self.state.next_id(),
            lawyer_id: template.lawyer_id,
            branch_id: template.branch_id,
            weekday: template.weekday,
            start_local_time: template.start_local_time,
            end_local_time: template.end_local_time,
            slot_minutes: template.slot_minutes,
            max_bookings: template.max_bookings,
            is_active: true,
        };
        self.state.templates.push(stored.clone());
        Ok(stored)
    }

    fn deactivate_template(&mut self, id: i64) -> Result<WeeklyAvailabilityTemplate, RepoError> {
        let template = self
            .state
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| missing("template", id))?;
        template.is_active = false;
        Ok(template.clone())
    }

    fn list_exceptions(
        &mut self,
        lawyer_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, RepoError> {
        Ok(self
            .state
            .exceptions
            .iter()
            .filter(|e| e.lawyer_id == lawyer_id && e.date == date && e.is_active)
            .cloned()
            .collect())
    }

    fn insert_exception(
        &mut self,
        exception: &NewAvailabilityException,
    ) -> Result<AvailabilityException, RepoError> {
        let stored = AvailabilityException {
            id: self.state.next_id(),
            lawyer_id: exception.lawyer_id,
            template_id: exception.template_id,
            date: exception.date,
            override_start: exception.override_start,
            override_end: exception.override_end,
            override_max_bookings: exception.override_max_bookings,
            is_active: true,
        };
        self.state.exceptions.push(stored.clone());
        Ok(stored)
    }

    fn list_blackouts(
        &mut self,
        lawyer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BlackoutDay>, RepoError> {
        let mut found: Vec<BlackoutDay> = self
            .state
            .blackouts
            .iter()
            .filter(|b| b.lawyer_id == lawyer_id && from <= b.date && b.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.date);
        Ok(found)
    }

    fn insert_blackout(&mut self, blackout: &NewBlackoutDay) -> Result<BlackoutDay, RepoError> {
        let stored = BlackoutDay {
            id: self.state.next_id(),
            lawyer_id: blackout.lawyer_id,
            date: blackout.date,
            reason: blackout.reason.clone(),
        };
        self.state.blackouts.push(stored.clone());
        Ok(stored)
    }

    fn delete_blackout(&mut self, lawyer_id: i64, date: NaiveDate) -> Result<bool, RepoError> {
        let before = self.state.blackouts.len();
        self.state
            .blackouts
            .retain(|b| !(b.lawyer_id == lawyer_id && b.date == date));
        Ok(self.state.blackouts.len() < before)
    }
}

impl QueueRepo for Tx<'_> {
    fn max_token_number(
        &mut self,
        lawyer_id: i64,
        date_local: NaiveDate,
    ) -> Result<u32, RepoError> {
        Ok(self
            .state
            .queue
            .iter()
            .filter(|e| e.lawyer_id == lawyer_id && e.date_local == date_local)
            .map(|e| e.token_number)
            .max()
            .unwrap_or(0))
    }

    fn insert_entry(&mut self, entry: &NewQueueEntry) -> Result<QueueEntry, RepoError> {
        if *self.injected_token_conflicts > 0 {
            *self.injected_token_conflicts -= 1;
            return Err(RepoError::TokenConflict);
        }
        if self.state.queue.iter().any(|e| {
            e.lawyer_id == entry.lawyer_id
                && e.date_local == entry.date_local
                && e.token_number == entry.token_number
        }) {
            return Err(RepoError::TokenConflict);
        }
        let stored = QueueEntry {
            id: self.state.next_id(),
            date_local: entry.date_local,
            lawyer_id: entry.lawyer_id,
            client_id: entry.client_id,
            booking_id: entry.booking_id,
            token_number: entry.token_number,
            scheduled_time_local: entry.scheduled_time_local,
            branch_id: entry.branch_id,
            status: QueueStatus::Waiting,
            started_at: None,
            completed_at: None,
            reason: None,
        };
        self.state.queue.push(stored.clone());
        Ok(stored)
    }

    fn get_entry(&mut self, id: i64) -> Result<Option<QueueEntry>, RepoError> {
        Ok(self.state.queue.iter().find(|e| e.id == id).cloned())
    }

    fn update_status_and_timestamps(
        &mut self,
        id: i64,
        status: QueueStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> Result<QueueEntry, RepoError> {
        let entry = self
            .state
            .queue
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| missing("queue entry", id))?;
        entry.status = status;
        entry.started_at = started_at;
        entry.completed_at = completed_at;
        entry.reason = reason;
        Ok(entry.clone())
    }

    fn list_for_day(
        &mut self,
        lawyer_id: i64,
        date_local: NaiveDate,
    ) -> Result<Vec<QueueEntry>, RepoError> {
        let mut found: Vec<QueueEntry> = self
            .state
            .queue
            .iter()
            .filter(|e| e.lawyer_id == lawyer_id && e.date_local == date_local)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.token_number);
        Ok(found)
    }
}

impl DirectoryRepo for Tx<'_> {
    fn get_user(&mut self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.state.users.iter().find(|u| u.id == id).cloned())
    }

    fn get_branch(&mut self, id: i64) -> Result<Option<Branch>, RepoError> {
        Ok(self.state.branches.iter().find(|b| b.id == id).cloned())
    }

    fn get_case(&mut self, id: i64) -> Result<Option<CaseRef>, RepoError> {
        Ok(self.state.cases.iter().find(|c| c.id == id).copied())
    }

    fn get_service_package(&mut self, id: i64) -> Result<Option<ServicePackage>, RepoError> {
        Ok(self.state.packages.iter().find(|p| p.id == id).cloned())
    }
}

/// Monday 2026-02-02.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
}

pub fn local(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, h, m, 0).unwrap()
}

pub fn client(id: i64) -> Actor {
    Actor::new(id, Role::Client)
}

pub fn lawyer(id: i64) -> Actor {
    Actor::new(id, Role::Lawyer)
}

pub fn test_config() -> SchedulingConfig {
    SchedulingConfig::default()
}

/// Context evaluated on the reference Monday at 01:00Z (06:30 in Colombo).
pub fn context(config: &SchedulingConfig) -> OperationContext<'_> {
    OperationContext::new(config, &POLICY, utc(1, 0), Deadline::none())
}

/// Lawyer L with Monday 09:00-11:00 availability, clients C, D and E with
/// one case each, and a 30 minute package.
pub fn create_test_store() -> InMemoryStore {
    let mut store = InMemoryStore::default();
    store.state.next_id = 1000;
    store.add_user(LAWYER, Role::Lawyer);
    store.add_user(OTHER_LAWYER, Role::Lawyer);
    store.add_user(CLIENT_C, Role::Client);
    store.add_user(CLIENT_D, Role::Client);
    store.add_user(CLIENT_E, Role::Client);
    store.add_user(APPRENTICE, Role::Apprentice);
    store.add_case(CASE_C, CLIENT_C);
    store.add_case(CASE_D, CLIENT_D);
    store.add_case(CASE_E, CLIENT_E);
    store.add_package(PACKAGE_30, LAWYER, 30);
    store.add_branch(BRANCH, LAWYER);
    store.add_template(LAWYER, None, Weekday::Mon, local(9, 0), local(11, 0));
    store
}

/// Same directory as [`create_test_store`], but Monday is split into
/// 09:00-10:00 at `BRANCH` and 10:00-11:00 at `SECOND_BRANCH`.
pub fn create_two_branch_store() -> InMemoryStore {
    let mut store = create_test_store();
    store.state.templates.clear();
    store.add_branch(SECOND_BRANCH, LAWYER);
    store.add_template(LAWYER, Some(BRANCH), Weekday::Mon, local(9, 0), local(10, 0));
    store.add_template(LAWYER, Some(SECOND_BRANCH), Weekday::Mon, local(10, 0), local(11, 0));
    store
}

pub fn booking_request(case_id: i64, at: DateTime<Utc>) -> crate::CreateBookingRequest {
    crate::CreateBookingRequest {
        lawyer_id: LAWYER,
        branch_id: None,
        case_id,
        service_package_id: Some(PACKAGE_30),
        scheduled_at_utc: at,
        note: None,
    }
}
