// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lookups of rows owned by the identity, case and catalogue services.

use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{Branch, CaseRef, ServicePackage, User};

use crate::data_models::{BranchRow, CaseRow, ServicePackageRow, UserRow};
use crate::diesel_schema::{branches, cases, service_packages, users};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first::<UserRow>(conn)
        .optional()?
        .map(User::try_from)
        .transpose()
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_branch(
    conn: &mut SqliteConnection,
    branch_id: i64,
) -> Result<Option<Branch>, PersistenceError> {
    Ok(branches::table
        .filter(branches::branch_id.eq(branch_id))
        .select(BranchRow::as_select())
        .first::<BranchRow>(conn)
        .optional()?
        .map(Branch::from))
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_case(
    conn: &mut SqliteConnection,
    case_id: i64,
) -> Result<Option<CaseRef>, PersistenceError> {
    Ok(cases::table
        .filter(cases::case_id.eq(case_id))
        .select(CaseRow::as_select())
        .first::<CaseRow>(conn)
        .optional()?
        .map(CaseRef::from))
}

/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_service_package(
    conn: &mut SqliteConnection,
    service_package_id: i64,
) -> Result<Option<ServicePackage>, PersistenceError> {
    service_packages::table
        .filter(service_packages::service_package_id.eq(service_package_id))
        .select(ServicePackageRow::as_select())
        .first::<ServicePackageRow>(conn)
        .optional()?
        .map(ServicePackage::try_from)
        .transpose()
}
