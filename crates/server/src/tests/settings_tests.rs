// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::StatusCode;
use serde_json::json;

use super::helpers::{ADMIN, AGENT, create_test_app_state, send};
use crate::AppState;

#[tokio::test]
async fn test_get_settings_returns_defaults() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(&app_state, "GET", "/booking-settings", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["working_hours_start"], 9);
    assert_eq!(body["working_hours_end"], 17);
    assert_eq!(body["slot_duration_minutes"], 60);
    assert_eq!(body["off_days"], json!([]));
}

#[tokio::test]
async fn test_post_settings_as_admin_creates_policy() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(
        &app_state,
        "POST",
        "/booking-settings",
        Some(ADMIN),
        Some(json!({
            "working_hours_start": 10,
            "working_hours_end": 14,
            "slot_duration_minutes": 30,
            "off_days": [4]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["off_days"], json!([4]));

    let (_, slots) = send(
        &app_state,
        "GET",
        "/available-slots?date=2025-11-03",
        None,
        None,
    )
    .await;
    assert_eq!(slots["total_available_slots"], 8);
    assert_eq!(slots["available_slots"][0]["time"], "10:00");
    assert_eq!(slots["available_slots"][0]["end_time"], "10:30");
}

#[tokio::test]
async fn test_put_settings_requires_admin() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(
        &app_state,
        "PUT",
        "/booking-settings",
        Some(AGENT),
        Some(json!({"off_days": [5, 6]})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn test_put_settings_merges() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(
        &app_state,
        "PUT",
        "/booking-settings",
        Some(ADMIN),
        Some(json!({"working_hours_end": 12})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["working_hours_start"], 9);
    assert_eq!(body["working_hours_end"], 12);
}

#[tokio::test]
async fn test_calendar_endpoint() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(
        &app_state,
        "GET",
        "/booking-calendar?year=2025&month=2",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"].as_array().unwrap().len(), 28);
    assert_eq!(body["working_hours"]["start"], "09:00");
    assert_eq!(body["days"][0]["day_name"], "Saturday");
    assert_eq!(body["days"][0]["is_weekend"], true);
}
