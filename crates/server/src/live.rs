// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live booking notifications for admin dashboards.
//!
//! Dashboards join the `admin_bookings` group over a WebSocket and receive
//! every ledger mutation as it commits. Events are informational; the HTTP
//! API remains the source of truth.
//!
//! # Protocol
//!
//! - Server, on connect: `{"type": "connected", "timestamp": ...}`
//! - Server, on mutation: `{"type": "booking_created" | "booking_updated" | "booking_deleted", "data": {...}}`
//! - Client: `{"type": "get_bookings"}`, answered with
//!   `{"type": "bookings_data", "data": [...]}` holding the most recent records
//!
//! Late joiners get no replay. A subscriber that falls more than
//! [`EVENT_BUFFER_SIZE`] events behind loses the oldest ones.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::rejection::WebSocketUpgradeRejection,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, stream::StreamExt};
use reserva_api::{
    ADMIN_BOOKINGS_GROUP, ApiError, AuthorizationService, BookingEvent, BookingSnapshot, BusError,
    NotificationBus, recent_bookings,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::caller::Caller;
use crate::{AppState, HttpError};

/// Maximum number of events to buffer in the broadcast channel.
pub const EVENT_BUFFER_SIZE: usize = 100;

/// Server-originated live messages other than booking events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
    /// Reply to `get_bookings`.
    BookingsData {
        /// The most recently created reservations.
        data: Vec<BookingSnapshot>,
    },
}

/// Messages a dashboard may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Requests a snapshot of the most recent bookings.
    GetBookings,
}

/// Broadcast-backed notification bus for the `admin_bookings` group.
///
/// Events are encoded once at publish time and fanned out as JSON text.
#[derive(Clone)]
pub struct LiveEventBus {
    tx: broadcast::Sender<String>,
}

impl LiveEventBus {
    /// Creates a new bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Joins the `admin_bookings` group.
    ///
    /// Only events published after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus for LiveEventBus {
    fn publish(&self, group: &str, event: &BookingEvent) -> Result<(), BusError> {
        if group != ADMIN_BOOKINGS_GROUP {
            return Err(BusError::Unavailable(format!("unknown group '{group}'")));
        }

        let json: String =
            serde_json::to_string(event).map_err(|e| BusError::Encoding(e.to_string()))?;

        match self.tx.send(json) {
            Ok(receivers) => {
                debug!(
                    message_type = event.message_type,
                    receivers, "Broadcast booking event"
                );
            }
            Err(_) => {
                // No subscribers
                debug!(message_type = event.message_type, "No receivers for booking event");
            }
        }
        Ok(())
    }
}

/// Handles WebSocket upgrade requests for the admin bookings channel.
///
/// # Arguments
///
/// * `caller` - The identified caller; must be an admin
/// * `app_state` - Application state holding the bus and ledger
/// * `ws` - WebSocket upgrade request
///
/// # Returns
///
/// An HTTP response that upgrades the connection to WebSocket, or an error
/// response if the caller may not join.
pub async fn admin_bookings_socket(
    Caller(caller): Caller,
    AxumState(app_state): AxumState<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    // Authorize before looking at the handshake
    if let Err(e) = AuthorizationService::authorize_admin_bookings(&caller) {
        return HttpError::from(ApiError::from(e)).into_response();
    }
    let ws: WebSocketUpgrade = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    info!(user_id = caller.user_id, "Admin joined live bookings channel");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

fn encode(message: &LiveMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(json) => Some(json),
        Err(e) => {
            error!(?e, "Failed to serialize live message");
            None
        }
    }
}

fn connected_message() -> LiveMessage {
    LiveMessage::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .replace_nanosecond(0)
            .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    }
}

/// Builds the `bookings_data` reply from the ledger.
async fn bookings_snapshot(app_state: &AppState) -> Option<String> {
    let mut persistence = app_state.persistence.lock().await;
    match recent_bookings(&mut persistence, app_state.snapshot_limit) {
        Ok(data) => encode(&LiveMessage::BookingsData { data }),
        Err(e) => {
            error!(error = %e, "Failed to load bookings snapshot");
            None
        }
    }
}

/// Handles an individual WebSocket connection.
///
/// Sends a connection confirmation, then streams booking events and answers
/// snapshot requests until the client disconnects or an error occurs.
async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events: broadcast::Receiver<String> = app_state.bus.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(8);

    if let Some(json) = encode(&connected_message())
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending events and replies to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let frame: String = tokio::select! {
                event = events.recv() => match event {
                    Ok(json) => json,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Live subscriber lagged, events dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(json) => json,
                    None => break,
                },
            };

            if sender.send(Message::Text(frame.into())).await.is_err() {
                // Client disconnected
                break;
            }
        }
    });

    // Task for handling client requests
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(ClientMessage::GetBookings) => {
                            if let Some(json) = bookings_snapshot(&app_state).await
                                && reply_tx.send(json).await.is_err()
                            {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "Ignoring unrecognised client message"),
                    }
                }
                Ok(Message::Binary(_)) => {
                    warn!("Received unexpected binary message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live bookings channel");
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserva_api::UserDetails;
    use reserva_domain::BookingEventKind;

    fn snapshot(id: i64) -> BookingSnapshot {
        BookingSnapshot {
            id,
            user_id: 7,
            service_name: String::from("Contract review"),
            booking_date: String::from("2025-11-03"),
            booking_time: String::from("09:00"),
            display_time: String::from("09:00 AM"),
            end_time: String::from("10:00"),
            duration_minutes: 60,
            status: String::from("upcoming"),
            notes: None,
            created_at: String::from("2025-11-01T08:00:00Z"),
            updated_at: String::from("2025-11-01T08:00:00Z"),
            user_details: UserDetails {
                id: 7,
                phone: String::from("0501112222"),
                first_name: String::from("Omar"),
                last_name: String::new(),
                email: String::new(),
                is_active: true,
                date_joined: String::from("2025-11-01T08:00:00Z"),
                gender: String::new(),
                country: String::new(),
            },
        }
    }

    #[test]
    fn test_bus_creation() {
        let bus = LiveEventBus::new();
        assert_eq!(bus.tx.receiver_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = LiveEventBus::new();
        let event = BookingEvent::new(BookingEventKind::Created, snapshot(1));
        assert!(bus.publish(ADMIN_BOOKINGS_GROUP, &event).is_ok());
    }

    #[test]
    fn test_every_subscriber_receives_event() {
        let bus = LiveEventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = BookingEvent::new(BookingEventKind::Deleted, snapshot(3));
        bus.publish(ADMIN_BOOKINGS_GROUP, &event).unwrap();

        for rx in [&mut rx1, &mut rx2] {
            let json: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(json["type"], "booking_deleted");
            assert_eq!(json["data"]["id"], 3);
        }
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let bus = LiveEventBus::new();
        let event = BookingEvent::new(BookingEventKind::Created, snapshot(1));
        bus.publish(ADMIN_BOOKINGS_GROUP, &event).unwrap();

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        let bus = LiveEventBus::new();
        let event = BookingEvent::new(BookingEventKind::Created, snapshot(1));
        assert!(matches!(
            bus.publish("staff", &event),
            Err(BusError::Unavailable(_))
        ));
    }

    #[test]
    fn test_live_message_wire_shape() {
        let connected: serde_json::Value =
            serde_json::to_value(connected_message()).unwrap();
        assert_eq!(connected["type"], "connected");
        assert!(connected["timestamp"].as_str().unwrap().ends_with('Z'));

        let data: serde_json::Value = serde_json::to_value(LiveMessage::BookingsData {
            data: vec![snapshot(2)],
        })
        .unwrap();
        assert_eq!(data["type"], "bookings_data");
        assert_eq!(data["data"][0]["id"], 2);

        let request: ClientMessage = serde_json::from_str(r#"{"type": "get_bookings"}"#).unwrap();
        assert!(matches!(request, ClientMessage::GetBookings));
    }
}
