use serde_json::Value;
use uuid::Uuid;

/// The two independent live streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveChannel {
    Alerts,
    Incidents,
}

impl LiveChannel {
    /// Entity prefix used in event names.
    pub fn entity(&self) -> &'static str {
        match self {
            LiveChannel::Alerts => "alert",
            LiveChannel::Incidents => "incident",
        }
    }
}

/// Which mutation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

/// One mutation event pushed to live subscribers.
///
/// Create and update carry the full mutated document; delete carries only
/// the identifier.
#[derive(Debug, Clone)]
pub struct LiveEvent {
    pub channel: LiveChannel,
    pub kind: MutationKind,
    pub payload: Value,
}

impl LiveEvent {
    pub fn new(channel: LiveChannel, kind: MutationKind, payload: Value) -> Self {
        Self {
            channel,
            kind,
            payload,
        }
    }

    /// Event for a deleted document, carrying just its id.
    pub fn deleted(channel: LiveChannel, id: Uuid) -> Self {
        Self {
            channel,
            kind: MutationKind::Delete,
            payload: serde_json::json!({ "id": id }),
        }
    }

    /// SSE event name, `<entity>:<mutation>`.
    pub fn name(&self) -> String {
        format!("{}:{}", self.channel.entity(), self.kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_follow_the_entity_mutation_scheme() {
        let event = LiveEvent::new(
            LiveChannel::Alerts,
            MutationKind::Create,
            serde_json::json!({}),
        );
        assert_eq!(event.name(), "alert:create");

        let event = LiveEvent::new(
            LiveChannel::Incidents,
            MutationKind::Update,
            serde_json::json!({}),
        );
        assert_eq!(event.name(), "incident:update");
    }

    #[test]
    fn delete_events_carry_only_the_id() {
        let id = Uuid::new_v4();
        let event = LiveEvent::deleted(LiveChannel::Incidents, id);
        assert_eq!(event.name(), "incident:delete");
        assert_eq!(event.payload, serde_json::json!({ "id": id }));
    }
}
