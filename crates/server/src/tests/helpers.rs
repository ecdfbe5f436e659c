// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use reserva_domain::{OwnerProfile, OwnerSummary};
use reserva_persistence::Persistence;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::caller::{CALLER_ID_HEADER, CALLER_ROLE_HEADER};
use crate::live::LiveEventBus;
use crate::{AppState, build_router};

/// Helper to create test app state with in-memory persistence.
pub fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        bus: Arc::new(LiveEventBus::new()),
        timezone: chrono_tz::UTC,
        snapshot_limit: 50,
    }
}

pub async fn create_test_user(app_state: &AppState, phone: &str) -> OwnerSummary {
    app_state
        .persistence
        .lock()
        .await
        .create_user(
            phone,
            &OwnerProfile {
                first_name: Some(String::from("Rana")),
                ..OwnerProfile::default()
            },
        )
        .expect("user created")
}

/// An identified caller for requests.
#[derive(Clone, Copy)]
pub struct As(pub i64, pub &'static str);

pub const ADMIN: As = As(1000, "admin");
pub const AGENT: As = As(2000, "agent");

/// Sends one request through a fresh router and returns status and JSON body.
pub async fn send(
    app_state: &AppState,
    method: &str,
    uri: &str,
    caller: Option<As>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let app: Router = build_router(app_state.clone());

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(As(id, role)) = caller {
        builder = builder
            .header(CALLER_ID_HEADER, id.to_string())
            .header(CALLER_ROLE_HEADER, role);
    }
    let request: Request<Body> = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn booking_body(date: &str, time: &str) -> Value {
    serde_json::json!({
        "service_name": "Contract review",
        "date": date,
        "time": time,
    })
}
