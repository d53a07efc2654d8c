// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{CLIENT_C, LAWYER, client, context, create_test_directory, create_test_persistence};
use crate::{Persistence, PersistenceError};
use docket::{SchedulingConfig, list_weekly_templates};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());

    // a case for an unregistered client violates the users reference
    let orphan = persistence.register_case(&docket_domain::CaseRef {
        id: 1,
        client_id: 999,
    });
    assert!(matches!(orphan, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut seeded = create_test_persistence();
    let mut empty = create_test_directory();
    let config = SchedulingConfig::default();

    let seeded_templates =
        list_weekly_templates(&mut seeded, &context(&config), &client(CLIENT_C), LAWYER).unwrap();
    let empty_templates =
        list_weekly_templates(&mut empty, &context(&config), &client(CLIENT_C), LAWYER).unwrap();

    assert_eq!(seeded_templates.len(), 1);
    assert!(empty_templates.is_empty());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!("docket_test_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence
            .register_user(&docket_domain::User {
                id: LAWYER,
                role: docket_domain::Role::Lawyer,
                display_name: String::from("L"),
            })
            .unwrap();
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let config = SchedulingConfig::default();
    let templates =
        list_weekly_templates(&mut reopened, &context(&config), &client(CLIENT_C), LAWYER);
    assert!(templates.is_ok(), "lawyer row should persist across reopen");

    drop(reopened);
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

#[test]
fn test_register_user_upserts() {
    let mut persistence = create_test_directory();
    persistence
        .register_user(&docket_domain::User {
            id: CLIENT_C,
            role: docket_domain::Role::Client,
            display_name: String::from("Renamed"),
        })
        .unwrap();
    let user = crate::queries::directory::get_user(&mut persistence.conn, CLIENT_C)
        .unwrap()
        .unwrap();
    assert_eq!(user.display_name, "Renamed");
}
