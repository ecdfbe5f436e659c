// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_domain::{OwnerProfile, OwnerSummary};
use time::macros::time;

use crate::tests::{MONDAY, book, create_test_persistence, create_test_user};
use crate::{Persistence, PersistenceError};

#[test]
fn test_absent_profile_fields_have_defined_defaults() {
    let mut persistence: Persistence = create_test_persistence();

    let user: OwnerSummary = persistence
        .create_user("0500000001", &OwnerProfile::default())
        .unwrap();

    assert_eq!(user.phone, "0500000001");
    assert_eq!(user.first_name, "");
    assert_eq!(user.last_name, "");
    assert_eq!(user.email, "");
    assert_eq!(user.gender, None);
    assert_eq!(user.country, None);
    assert!(user.is_active);
}

#[test]
fn test_find_or_create_creates_once() {
    let mut persistence: Persistence = create_test_persistence();
    let profile: OwnerProfile = OwnerProfile {
        first_name: Some(String::from("Omar")),
        country: Some(String::from("SA")),
        ..OwnerProfile::default()
    };

    let (created, was_created) = persistence
        .find_or_create_user("0500000002", &profile)
        .unwrap();
    assert!(was_created);
    assert_eq!(created.first_name, "Omar");
    assert_eq!(created.country.as_deref(), Some("SA"));

    // The profile is only used on creation
    let (found, was_created) = persistence
        .find_or_create_user("0500000002", &OwnerProfile::default())
        .unwrap();
    assert!(!was_created);
    assert_eq!(found, created);
}

#[test]
fn test_duplicate_phone_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    create_test_user(&mut persistence, "0500000003");

    let result: Result<OwnerSummary, PersistenceError> =
        persistence.create_user("0500000003", &OwnerProfile::default());
    assert!(result.is_err());
}

#[test]
fn test_missing_user_is_none() {
    let mut persistence: Persistence = create_test_persistence();
    assert_eq!(persistence.get_user(42).unwrap(), None);
}

#[test]
fn test_failed_unit_of_work_rolls_back_new_user() {
    let mut persistence: Persistence = create_test_persistence();
    let owner_id: i64 = create_test_user(&mut persistence, "0500000010").user_id;
    book(&mut persistence, owner_id, MONDAY, time!(09:00)).unwrap();

    let result: Result<(), PersistenceError> = persistence.atomically(|persistence| {
        let (user, was_created) =
            persistence.find_or_create_user("0500000011", &OwnerProfile::default())?;
        assert!(was_created);
        book(persistence, user.user_id, MONDAY, time!(09:00))?;
        Ok(())
    });
    assert!(matches!(result, Err(PersistenceError::SlotConflict { .. })));

    let (_, was_created) = persistence
        .find_or_create_user("0500000011", &OwnerProfile::default())
        .unwrap();
    assert!(was_created);
}

#[test]
fn test_successful_unit_of_work_commits_every_write() {
    let mut persistence: Persistence = create_test_persistence();

    let reservation_id: i64 = persistence
        .atomically(|persistence| -> Result<i64, PersistenceError> {
            let (user, _) =
                persistence.find_or_create_user("0500000012", &OwnerProfile::default())?;
            Ok(book(persistence, user.user_id, MONDAY, time!(10:00))?
                .record
                .reservation
                .reservation_id)
        })
        .unwrap();

    let (user, was_created) = persistence
        .find_or_create_user("0500000012", &OwnerProfile::default())
        .unwrap();
    assert!(!was_created);
    let stored = persistence.get_reservation(reservation_id).unwrap().unwrap();
    assert_eq!(stored.owner_id, user.user_id);
}
