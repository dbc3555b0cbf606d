//! Realtime WebSocket Handler
//!
//! Delivers the session operations (`set_name`, `train_example`, `predict`,
//! `reset_model`) over a WebSocket and forwards broadcast events to every
//! connection.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::session::SessionState;
use crate::training::{ExampleSubmission, FeaturesSubmission, TrainingError};

use super::server::AppState;

// ==================
// Wire Messages
// ==================

/// Message from a participant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register a display name
    SetName {
        #[serde(default)]
        name: String,
    },

    /// Submit a labeled example
    TrainExample(ExampleSubmission),

    /// Ask the current model for a prediction
    Predict(FeaturesSubmission),

    /// Clear dataset and model for everyone
    ResetModel,

    /// Keepalive
    Ping,
}

/// Reply sent only to the requesting participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Dataset size, sent after `set_name`
    Status { dataset_size: usize },

    /// Prediction with the features it was made for
    PredictionResult {
        age: f64,
        income: f64,
        has_protected_attribute: bool,
        prediction: bool,
    },

    /// Error message
    Error { code: String, message: String },

    /// Keepalive response
    Pong,
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<TrainingError> for ServerMessage {
    fn from(e: TrainingError) -> Self {
        ServerMessage::error(e.code(), e.to_string())
    }
}

// ==================
// Dispatch
// ==================

/// Apply one client message to the session.
///
/// Returns the reply for the requester, if any. Accepted examples and resets
/// reach the requester through the broadcast like everyone else.
pub fn handle_client_message(
    session: &SessionState,
    connection_id: &str,
    message: ClientMessage,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::SetName { name } => Some(match session.join(connection_id, &name) {
            Ok(dataset_size) => ServerMessage::Status { dataset_size },
            Err(e) => e.into(),
        }),
        ClientMessage::TrainExample(submission) => session
            .submit_example(connection_id, &submission)
            .err()
            .map(ServerMessage::from),
        ClientMessage::Predict(submission) => Some(match session.predict(&submission) {
            Ok((features, prediction)) => ServerMessage::PredictionResult {
                age: features.age,
                income: features.income,
                has_protected_attribute: features.has_protected_attribute,
                prediction,
            },
            Err(e) => e.into(),
        }),
        ClientMessage::ResetModel => session.reset(connection_id).err().map(ServerMessage::from),
        ClientMessage::Ping => Some(ServerMessage::Pong),
    }
}

/// Parse and apply a text frame
pub fn handle_client_text(
    session: &SessionState,
    connection_id: &str,
    text: &str,
) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => handle_client_message(session, connection_id, message),
        Err(e) => {
            log_event_with_fields(
                Event::InvalidMessage,
                &[("connection_id", connection_id), ("reason", &e.to_string())],
            );
            Some(ServerMessage::error(
                "INVALID_MESSAGE",
                format!("Invalid message format: {}", e),
            ))
        }
    }
}

// ==================
// Realtime Routes
// ==================

/// Create realtime routes
pub fn realtime_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Handle WebSocket upgrade request
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let max_message_bytes = state.config.max_message_bytes;
    ws.max_message_size(max_message_bytes)
        .on_upgrade(move |socket| handle_websocket(socket, state))
}

type WsSender = SplitSink<WebSocket, Message>;

async fn send_json<T: Serialize>(sender: &mut WsSender, message: &T) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            log_event_with_fields(Event::InvalidMessage, &[("reason", &e.to_string())]);
            Ok(())
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4().to_string();
    let session = Arc::clone(&state.session);
    session.metrics().increment_connections();
    log_event_with_fields(Event::ParticipantConnected, &[("connection_id", &connection_id)]);

    let (mut sender, mut receiver) = socket.split();
    let mut events = state.broadcast.subscribe();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_text(&session, &connection_id, &text) {
                            if send_json(&mut sender, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let reply = ServerMessage::error("INVALID_MESSAGE", "Binary messages not supported");
                        if send_json(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if send_json(&mut sender, &event).await.is_err() {
                            break;
                        }
                    }
                    // Slow reader: skip what was missed, keep the connection.
                    Err(RecvError::Lagged(skipped)) => {
                        log_event_with_fields(
                            Event::BroadcastLagged,
                            &[("connection_id", &connection_id), ("skipped", &skipped.to_string())],
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    let name = session.leave(&connection_id);
    log_event_with_fields(
        Event::ParticipantDisconnected,
        &[
            ("connection_id", &connection_id),
            ("name", name.as_deref().unwrap_or("")),
        ],
    );
}
