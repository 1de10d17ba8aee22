//! Event delivery to interested clients

use tokio::sync::broadcast;
use tracing::trace;

use tandem_protocol::MonitorEvent;

/// Default buffered events per subscriber
pub const DEFAULT_SINK_CAPACITY: usize = 256;

/// Receives monitor events
///
/// Delivery is fire-and-forget: implementations must not block and may
/// drop events nobody listens to.
pub trait MessageSink: Send + Sync {
    fn broadcast(&self, event: MonitorEvent);
}

/// Fan-out over a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<MonitorEvent>,
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_CAPACITY)
    }
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl MessageSink for BroadcastSink {
    fn broadcast(&self, event: MonitorEvent) {
        let event_type = event.event_type();
        if self.tx.send(event).is_err() {
            trace!(event_type, "No subscribers for event");
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn broadcast(&self, _event: MonitorEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_protocol::{SessionKey, StopReason, ToolId};

    fn stopped() -> MonitorEvent {
        MonitorEvent::PollerStopped {
            key: SessionKey::new("ws", ToolId::Claude),
            reason: StopReason::Cancelled,
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let sink = BroadcastSink::default();
        let mut rx1 = sink.subscribe();
        let mut rx2 = sink.subscribe();
        assert_eq!(sink.receiver_count(), 2);

        sink.broadcast(stopped());

        assert_eq!(rx1.recv().await.unwrap(), stopped());
        assert_eq!(rx2.recv().await.unwrap(), stopped());
    }

    #[test]
    fn test_broadcast_without_subscribers_does_not_fail() {
        let sink = BroadcastSink::new(4);
        sink.broadcast(stopped());
        NullSink.broadcast(stopped());
    }
}
