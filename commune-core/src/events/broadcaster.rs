use super::types::{LiveChannel, LiveEvent};
use tokio::sync::broadcast;

/// Buffer size per live channel. A subscriber that falls further behind
/// than this skips the missed events.
pub const LIVE_CHANNEL_CAPACITY: usize = 256;

/// Per-process registry of live subscribers.
///
/// An explicit object passed through application state rather than a
/// module-level singleton, so tests and multiple servers can hold isolated
/// instances. Subscribers deregister automatically when their receiver is
/// dropped on disconnect.
#[derive(Debug, Clone)]
pub struct LiveBroadcaster {
    alerts: broadcast::Sender<LiveEvent>,
    incidents: broadcast::Sender<LiveEvent>,
}

impl LiveBroadcaster {
    pub fn new() -> Self {
        let (alerts, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        let (incidents, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self { alerts, incidents }
    }

    fn sender(&self, channel: LiveChannel) -> &broadcast::Sender<LiveEvent> {
        match channel {
            LiveChannel::Alerts => &self.alerts,
            LiveChannel::Incidents => &self.incidents,
        }
    }

    /// Register a new subscriber on a channel.
    pub fn subscribe(&self, channel: LiveChannel) -> broadcast::Receiver<LiveEvent> {
        self.sender(channel).subscribe()
    }

    /// Publish one event to every current subscriber of its channel.
    ///
    /// Returns the number of subscribers the event was handed to. Zero
    /// subscribers is a silent no-op.
    pub fn publish(&self, event: LiveEvent) -> usize {
        let sender = self.sender(event.channel);
        match sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    /// Number of currently-registered subscribers on a channel.
    pub fn subscriber_count(&self, channel: LiveChannel) -> usize {
        self.sender(channel).receiver_count()
    }
}

impl Default for LiveBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::MutationKind;

    #[test]
    fn publishing_without_subscribers_is_a_silent_noop() {
        let broadcaster = LiveBroadcaster::new();
        let delivered = broadcaster.publish(LiveEvent::new(
            LiveChannel::Alerts,
            MutationKind::Create,
            serde_json::json!({}),
        ));
        assert_eq!(delivered, 0);
        assert_eq!(broadcaster.subscriber_count(LiveChannel::Alerts), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events_on_their_channel_only() {
        let broadcaster = LiveBroadcaster::new();
        let mut alerts_rx = broadcaster.subscribe(LiveChannel::Alerts);
        let mut incidents_rx = broadcaster.subscribe(LiveChannel::Incidents);

        let delivered = broadcaster.publish(LiveEvent::new(
            LiveChannel::Alerts,
            MutationKind::Update,
            serde_json::json!({"severity": "high"}),
        ));
        assert_eq!(delivered, 1);

        let event = alerts_rx.recv().await.expect("alert event");
        assert_eq!(event.name(), "alert:update");
        assert!(incidents_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropping_the_receiver_deregisters_the_subscriber() {
        let broadcaster = LiveBroadcaster::new();
        let rx = broadcaster.subscribe(LiveChannel::Incidents);
        assert_eq!(broadcaster.subscriber_count(LiveChannel::Incidents), 1);
        drop(rx);
        assert_eq!(broadcaster.subscriber_count(LiveChannel::Incidents), 0);
    }
}
