//! Player notifications delivered to the synchronizer
//!
//! The host owns a [`PlayerEventBus`] and hands a receiver to the
//! synchronizer at spawn time. Notifications are fanned out over a tokio
//! broadcast channel so several consumers (monitor logging, synchronizer)
//! can observe the same stream.

use tokio::sync::broadcast;

use crate::snapshot::ChangeTimestamp;

/// Channel capacity for the broadcast channel
const BROADCAST_CAPACITY: usize = 256;

/// Route name of the queue page
pub const QUEUE_ROUTE: &str = "/queue";

/// Notifications from the player and host
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A different player became current
    PlayerChanged(String),
    /// Latest queue details seen by the status poller
    PlaylistDetails {
        current_index: Option<usize>,
        timestamp: ChangeTimestamp,
    },
    /// Host navigated between routes; `scroll_pos` is the offset on leaving `from`
    RouteChanged {
        from: String,
        to: String,
        scroll_pos: f64,
    },
    /// Queue page shown or hidden
    VisibilityChanged(bool),
}

/// In-process notification fan-out
#[derive(Debug, Clone)]
pub struct PlayerEventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl PlayerEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: PlayerEvent) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PlayerEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = PlayerEventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PlayerEvent::PlaylistDetails {
            current_index: Some(2),
            timestamp: ChangeTimestamp::new("t1"),
        });

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received,
            PlayerEvent::PlaylistDetails { current_index: Some(2), .. }
        ));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = PlayerEventBus::new();
        bus.publish(PlayerEvent::VisibilityChanged(true));
        assert_eq!(bus.receiver_count(), 0);
    }
}
