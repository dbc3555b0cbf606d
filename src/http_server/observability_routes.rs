//! Read-only HTTP Routes
//!
//! Health check, current model inspection and operational counters.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::observability::MetricsSnapshot;
use crate::session::Participant;
use crate::training::ModelSnapshot;

use super::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Current model and dataset overview
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub dataset_size: usize,
    pub participants: usize,
    /// Named participants, earliest joined first
    pub roster: Vec<RosterEntry>,
    /// `null` until the first example arrives and after a reset
    pub model: Option<ModelSnapshot>,
}

/// One named participant
#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub joined_at: String,
}

impl From<Participant> for RosterEntry {
    fn from(participant: Participant) -> Self {
        Self {
            name: participant.name,
            joined_at: participant.joined_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Model and metrics routes
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/model", get(model_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn model_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (dataset_size, model) = state.session.model().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                code: e.code().to_string(),
            }),
        )
    })?;

    let roster: Vec<RosterEntry> = state
        .session
        .participants()
        .list()
        .into_iter()
        .map(RosterEntry::from)
        .collect();

    Ok(Json(ModelResponse {
        dataset_size,
        participants: roster.len(),
        roster,
        model,
    }))
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.session.metrics().snapshot())
}
