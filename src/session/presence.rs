//! # Presence Tracking
//!
//! Display names registered per connection. The live participant count is
//! the number of connections that registered a name.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::training::{TrainingError, TrainingResult};

/// A participant that registered a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Connection ID
    pub connection_id: String,

    /// Display name
    pub name: String,

    /// When the name was (last) registered
    pub joined_at: DateTime<Utc>,
}

/// Registry of named participants keyed by connection ID
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: RwLock<HashMap<String, Participant>>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rename a connection. Returns the live participant count.
    ///
    /// `on_registered` runs with the new count before the registry lock is
    /// released, so counts it publishes follow registration order.
    pub fn register(
        &self,
        connection_id: &str,
        name: &str,
        on_registered: impl FnOnce(usize),
    ) -> TrainingResult<usize> {
        let mut participants = self
            .participants
            .write()
            .map_err(|_| TrainingError::Internal("Lock poisoned".into()))?;

        participants.insert(
            connection_id.to_string(),
            Participant {
                connection_id: connection_id.to_string(),
                name: name.to_string(),
                joined_at: Utc::now(),
            },
        );

        let count = participants.len();
        on_registered(count);
        Ok(count)
    }

    /// Forget a connection, returning its participant if it had registered
    pub fn remove(&self, connection_id: &str) -> Option<Participant> {
        self.participants
            .write()
            .ok()
            .and_then(|mut p| p.remove(connection_id))
    }

    /// Registered name of a connection
    pub fn name_of(&self, connection_id: &str) -> Option<String> {
        self.participants
            .read()
            .ok()
            .and_then(|p| p.get(connection_id).map(|participant| participant.name.clone()))
    }

    /// Live participant count
    pub fn count(&self) -> usize {
        self.participants.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Registered participants, earliest joined first
    pub fn list(&self) -> Vec<Participant> {
        let mut list: Vec<Participant> = self
            .participants
            .read()
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default();
        list.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });
        list
    }
}
