//! Observable events
//!
//! Every log line the server emits names one of these events.

use std::fmt;

/// Observable server events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Server startup begins
    ServerStart,
    /// Listener bound, accepting connections
    ServerReady,
    /// Server failed to start (FATAL)
    ServerFailed,

    // Participants
    /// WebSocket connection opened
    ParticipantConnected,
    /// Connection registered a display name
    ParticipantJoined,
    /// WebSocket connection closed
    ParticipantDisconnected,
    /// Client sent something that is not a valid message
    InvalidMessage,
    /// Connection fell behind the broadcast buffer and skipped events
    BroadcastLagged,

    // Training
    /// Example appended to the dataset
    ExampleAccepted,
    /// Example failed validation
    ExampleRejected,
    /// New model snapshot installed
    ModelTrained,
    /// Dataset and model cleared
    ModelReset,

    // Prediction
    /// Prediction could not be served
    PredictionRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStart => "SERVER_START",
            Event::ServerReady => "SERVER_READY",
            Event::ServerFailed => "SERVER_FAILED",

            Event::ParticipantConnected => "PARTICIPANT_CONNECTED",
            Event::ParticipantJoined => "PARTICIPANT_JOINED",
            Event::ParticipantDisconnected => "PARTICIPANT_DISCONNECTED",
            Event::InvalidMessage => "INVALID_MESSAGE",
            Event::BroadcastLagged => "BROADCAST_LAGGED",

            Event::ExampleAccepted => "EXAMPLE_ACCEPTED",
            Event::ExampleRejected => "EXAMPLE_REJECTED",
            Event::ModelTrained => "MODEL_TRAINED",
            Event::ModelReset => "MODEL_RESET",

            Event::PredictionRejected => "PREDICTION_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ServerFailed)
    }

    /// Returns true for recoverable, participant-caused problems
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::InvalidMessage
                | Event::BroadcastLagged
                | Event::ExampleRejected
                | Event::PredictionRejected
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
