// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use reserva_persistence::Persistence;

use super::helpers::{admin, create_test_persistence};
use crate::{
    ApiError, BookingSettingsRequest, BookingSettingsResponse, create_booking_settings,
    get_booking_settings, update_booking_settings,
};

#[test]
fn test_first_read_activates_defaults() {
    let mut persistence: Persistence = create_test_persistence();

    let settings: BookingSettingsResponse = get_booking_settings(&mut persistence).unwrap();

    assert_eq!(settings.working_hours_start, 9);
    assert_eq!(settings.working_hours_end, 17);
    assert_eq!(settings.slot_duration_minutes, 60);
    assert!(settings.off_days.is_empty());
    assert!(settings.is_active);

    let again: BookingSettingsResponse = get_booking_settings(&mut persistence).unwrap();
    assert_eq!(again.id, settings.id);
}

#[test]
fn test_create_settings_replaces_active_policy() {
    let mut persistence: Persistence = create_test_persistence();
    let before: BookingSettingsResponse = get_booking_settings(&mut persistence).unwrap();

    let created: BookingSettingsResponse = create_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest {
            working_hours_start: Some(8),
            working_hours_end: Some(12),
            slot_duration_minutes: Some(30),
            off_days: Some(vec![6, 4]),
        },
    )
    .unwrap();

    assert_ne!(created.id, before.id);
    assert_eq!(created.off_days, vec![4, 6]);
    assert_eq!(get_booking_settings(&mut persistence).unwrap(), created);
}

#[test]
fn test_create_settings_reports_every_missing_field() {
    let mut persistence: Persistence = create_test_persistence();

    let err: ApiError = create_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest::default(),
    )
    .unwrap_err();

    let fields = err.fields().unwrap();
    assert!(fields.contains_key("working_hours_start"));
    assert!(fields.contains_key("working_hours_end"));
    assert!(fields.contains_key("slot_duration_minutes"));
    assert!(!fields.contains_key("off_days"));
}

#[test]
fn test_create_settings_rejects_empty_window() {
    let mut persistence: Persistence = create_test_persistence();

    let err: ApiError = create_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest {
            working_hours_start: Some(17),
            working_hours_end: Some(9),
            slot_duration_minutes: Some(60),
            off_days: None,
        },
    )
    .unwrap_err();

    assert!(err.fields().unwrap().contains_key("working_hours_end"));
}

#[test]
fn test_update_settings_merges_present_fields() {
    let mut persistence: Persistence = create_test_persistence();
    let before: BookingSettingsResponse = get_booking_settings(&mut persistence).unwrap();

    let updated: BookingSettingsResponse = update_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest {
            off_days: Some(vec![5, 6]),
            ..BookingSettingsRequest::default()
        },
    )
    .unwrap();

    assert_eq!(updated.id, before.id);
    assert_eq!(updated.working_hours_start, 9);
    assert_eq!(updated.working_hours_end, 17);
    assert_eq!(updated.off_days, vec![5, 6]);
}

#[test]
fn test_update_settings_validates_merged_result() {
    let mut persistence: Persistence = create_test_persistence();

    // 18:00 opening is after the default 17:00 closing
    let err: ApiError = update_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest {
            working_hours_start: Some(18),
            ..BookingSettingsRequest::default()
        },
    )
    .unwrap_err();

    assert_eq!(err.kind(), "ValidationError");
    assert_eq!(
        get_booking_settings(&mut persistence)
            .unwrap()
            .working_hours_start,
        9
    );
}

#[test]
fn test_update_settings_rejects_empty_body() {
    let mut persistence: Persistence = create_test_persistence();

    let err: ApiError = update_booking_settings(
        &mut persistence,
        &admin(),
        &BookingSettingsRequest::default(),
    )
    .unwrap_err();

    assert!(err.fields().unwrap().contains_key("settings"));
}
