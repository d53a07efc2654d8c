// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Upserts for rows owned by external services.
//!
//! These keep the caller's ids so that references from the identity, case
//! and catalogue services stay valid.

use diesel::SqliteConnection;
use diesel::prelude::*;
use docket_domain::{Branch, CaseRef, ServicePackage, User};
use tracing::info;

use crate::data_models::{encode_count, encode_flag};
use crate::diesel_schema::{branches, cases, service_packages, users};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the upsert fails.
pub fn register_user(conn: &mut SqliteConnection, user: &User) -> Result<(), PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::user_id.eq(user.id),
            users::role.eq(user.role.as_str()),
            users::display_name.eq(&user.display_name),
        ))
        .on_conflict(users::user_id)
        .do_update()
        .set((
            users::role.eq(user.role.as_str()),
            users::display_name.eq(&user.display_name),
        ))
        .execute(conn)?;
    info!(user_id = user.id, role = user.role.as_str(), "Registered user");
    Ok(())
}

/// # Errors
///
/// Returns an error if the upsert fails or the owner is unknown.
pub fn register_branch(
    conn: &mut SqliteConnection,
    branch: &Branch,
) -> Result<(), PersistenceError> {
    diesel::insert_into(branches::table)
        .values((
            branches::branch_id.eq(branch.id),
            branches::owner_lawyer_id.eq(branch.owner_lawyer_id),
            branches::name.eq(&branch.name),
        ))
        .on_conflict(branches::branch_id)
        .do_update()
        .set((
            branches::owner_lawyer_id.eq(branch.owner_lawyer_id),
            branches::name.eq(&branch.name),
        ))
        .execute(conn)?;
    info!(branch_id = branch.id, owner = branch.owner_lawyer_id, "Registered branch");
    Ok(())
}

/// # Errors
///
/// Returns an error if the upsert fails or the client is unknown.
pub fn register_case(conn: &mut SqliteConnection, case: &CaseRef) -> Result<(), PersistenceError> {
    diesel::insert_into(cases::table)
        .values((
            cases::case_id.eq(case.id),
            cases::client_id.eq(case.client_id),
        ))
        .on_conflict(cases::case_id)
        .do_update()
        .set(cases::client_id.eq(case.client_id))
        .execute(conn)?;
    info!(case_id = case.id, client_id = case.client_id, "Registered case");
    Ok(())
}

/// # Errors
///
/// Returns an error if the upsert fails or the lawyer is unknown.
pub fn register_service_package(
    conn: &mut SqliteConnection,
    package: &ServicePackage,
) -> Result<(), PersistenceError> {
    let duration = encode_count("service_packages", package.duration_minutes)?;
    diesel::insert_into(service_packages::table)
        .values((
            service_packages::service_package_id.eq(package.id),
            service_packages::lawyer_id.eq(package.lawyer_id),
            service_packages::name.eq(&package.name),
            service_packages::duration_minutes.eq(duration),
            service_packages::active.eq(encode_flag(package.active)),
        ))
        .on_conflict(service_packages::service_package_id)
        .do_update()
        .set((
            service_packages::lawyer_id.eq(package.lawyer_id),
            service_packages::name.eq(&package.name),
            service_packages::duration_minutes.eq(duration),
            service_packages::active.eq(encode_flag(package.active)),
        ))
        .execute(conn)?;
    info!(
        service_package_id = package.id,
        lawyer_id = package.lawyer_id,
        duration_minutes = package.duration_minutes,
        "Registered service package"
    );
    Ok(())
}
