//! # Session Layer
//!
//! Owned session state shared by every connection.
//!
//! ## Architecture
//!
//! - **State**: dataset and model behind a single-writer lock
//! - **Broadcast**: injected fan-out capability (`notify_all`)
//! - **Presence**: registered participant names per connection
//! - **Event**: messages fanned out to all participants

pub mod broadcast;
pub mod event;
pub mod presence;
pub mod state;

pub use broadcast::{Broadcast, ChannelBroadcast, MemoryBroadcast};
pub use event::{SessionEvent, TrainingUpdate, RESET_MESSAGE};
pub use presence::{Participant, ParticipantRegistry};
pub use state::SessionState;
