//! # Session Events
//!
//! Events delivered to every participant.

use serde::{Deserialize, Serialize};

/// Message sent to everyone after a reset
pub const RESET_MESSAGE: &str = "The robot has been reset by a participant!";

/// Outcome of an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingUpdate {
    /// Dataset size after the append
    pub size: usize,
    pub accuracy: f64,
    pub fairness_gap: f64,
}

/// Event fanned out to all connected participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A participant registered a display name
    UserJoined { name: String, total_players: usize },

    /// The model was retrained after a new example
    DatasetUpdate {
        size: usize,
        accuracy: f64,
        fairness_gap: f64,
    },

    /// Dataset and model were cleared
    ResetDone { message: String },
}

impl SessionEvent {
    /// Event name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::UserJoined { .. } => "user_joined",
            SessionEvent::DatasetUpdate { .. } => "dataset_update",
            SessionEvent::ResetDone { .. } => "reset_done",
        }
    }
}

impl From<TrainingUpdate> for SessionEvent {
    fn from(update: TrainingUpdate) -> Self {
        SessionEvent::DatasetUpdate {
            size: update.size,
            accuracy: update.accuracy,
            fairness_gap: update.fairness_gap,
        }
    }
}
