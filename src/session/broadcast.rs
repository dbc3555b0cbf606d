//! # Broadcast
//!
//! Fan-out capability injected into the session state. The session never
//! enumerates connections itself.

use std::sync::Mutex;

use tokio::sync::broadcast;

use super::event::SessionEvent;

/// Something that can deliver an event to every participant
pub trait Broadcast: Send + Sync {
    fn notify_all(&self, event: SessionEvent);
}

/// Broadcast backed by a tokio broadcast channel.
///
/// Every connection holds its own receiver from [`ChannelBroadcast::subscribe`].
#[derive(Debug, Clone)]
pub struct ChannelBroadcast {
    sender: broadcast::Sender<SessionEvent>,
}

impl ChannelBroadcast {
    /// Create a channel buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Broadcast for ChannelBroadcast {
    fn notify_all(&self, event: SessionEvent) {
        // No receivers just means nobody is connected.
        let _ = self.sender.send(event);
    }
}

/// In-memory broadcast that records every event
#[derive(Debug, Default)]
pub struct MemoryBroadcast {
    events: Mutex<Vec<SessionEvent>>,
}

impl MemoryBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, oldest first
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Broadcast for MemoryBroadcast {
    fn notify_all(&self, event: SessionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_broadcast_reaches_all_receivers() {
        let broadcast = ChannelBroadcast::new(8);
        let mut rx1 = broadcast.subscribe();
        let mut rx2 = broadcast.subscribe();

        broadcast.notify_all(SessionEvent::ResetDone {
            message: "reset".to_string(),
        });

        assert_eq!(rx1.recv().await.unwrap().name(), "reset_done");
        assert_eq!(rx2.recv().await.unwrap().name(), "reset_done");
    }

    #[test]
    fn test_channel_broadcast_without_receivers() {
        let broadcast = ChannelBroadcast::new(8);
        broadcast.notify_all(SessionEvent::ResetDone {
            message: "nobody listening".to_string(),
        });
    }

    #[test]
    fn test_memory_broadcast_records() {
        let broadcast = MemoryBroadcast::new();
        broadcast.notify_all(SessionEvent::UserJoined {
            name: "a".to_string(),
            total_players: 1,
        });
        assert_eq!(broadcast.events().len(), 1);
    }
}
