// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::StatusCode;
use reserva_api::ADMIN_BOOKINGS_GROUP;
use serde_json::{Value, json};

use super::helpers::{ADMIN, As, booking_body, create_test_app_state, create_test_user, send};
use crate::AppState;

#[tokio::test]
async fn test_admin_create_get_status_delete() {
    let app_state: AppState = create_test_app_state();
    let owner = create_test_user(&app_state, "0501112222").await;

    let mut body: Value = booking_body("2025-11-03", "09:00");
    body["user_id"] = json!(owner.user_id);
    let (status, created) = send(&app_state, "POST", "/admin/bookings", Some(ADMIN), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_id"], owner.user_id);

    let uri: String = format!("/admin/bookings/{}", created["id"]);
    let (status, fetched) = send(&app_state, "GET", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["user_details"]["phone"], "0501112222");

    let (status, completed) = send(
        &app_state,
        "PUT",
        &format!("{uri}/status"),
        Some(ADMIN),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    let (status, deleted) = send(&app_state, "DELETE", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], created["id"]);

    let (status, _) = send(&app_state, "GET", &uri, Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_listing_paginates() {
    let app_state: AppState = create_test_app_state();
    for (index, time) in ["09:00", "10:00", "11:00"].iter().enumerate() {
        let owner = create_test_user(&app_state, &format!("050111222{index}")).await;
        send(
            &app_state,
            "POST",
            "/reservations",
            Some(As(owner.user_id, "user")),
            Some(booking_body("2025-11-03", time)),
        )
        .await;
    }

    let (status, page) = send(
        &app_state,
        "GET",
        "/admin/bookings?date=2025-11-03&limit=2&offset=0",
        Some(ADMIN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["bookings"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total_count"], 3);
    assert_eq!(page["pagination"]["has_more"], true);

    let (_, by_phone) = send(
        &app_state,
        "GET",
        "/admin/bookings?phone=2221",
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(by_phone["pagination"]["total_count"], 1);
    assert_eq!(by_phone["bookings"][0]["booking_time"], "10:00");
}

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let app_state: AppState = create_test_app_state();
    let owner = create_test_user(&app_state, "0501112222").await;

    let (status, body) = send(
        &app_state,
        "GET",
        "/admin/bookings",
        Some(As(owner.user_id, "user")),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn test_live_socket_requires_admin() {
    let app_state: AppState = create_test_app_state();

    let (status, body) = send(
        &app_state,
        "GET",
        "/ws/admin/bookings",
        Some(super::helpers::AGENT),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, _) = send(&app_state, "GET", "/ws/admin/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_live_socket_admin_without_handshake_is_rejected() {
    let app_state: AppState = create_test_app_state();

    let (status, _) = send(&app_state, "GET", "/ws/admin/bookings", Some(ADMIN), None).await;

    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mutations_reach_live_subscribers() {
    let app_state: AppState = create_test_app_state();
    let mut rx = app_state.bus.subscribe();
    let owner = create_test_user(&app_state, "0501112222").await;

    let (_, created) = send(
        &app_state,
        "POST",
        "/reservations",
        Some(As(owner.user_id, "user")),
        Some(booking_body("2025-11-03", "09:00")),
    )
    .await;
    send(
        &app_state,
        "DELETE",
        &format!("/admin/bookings/{}", created["id"]),
        Some(ADMIN),
        None,
    )
    .await;

    let first: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    let second: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(first["type"], "booking_created");
    assert_eq!(second["type"], "booking_deleted");
    assert_eq!(second["data"], created);
    assert_eq!(ADMIN_BOOKINGS_GROUP, "admin_bookings");
}
