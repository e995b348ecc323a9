//! Live event streams for security alerts and incidents.
//!
//! Every create/update/delete of an alert or incident is published once to
//! the corresponding channel. Delivery is best-effort: there is no backlog
//! or replay, and a subscriber that connects late misses prior events.

pub mod broadcaster;
pub mod types;

pub use broadcaster::{LIVE_CHANNEL_CAPACITY, LiveBroadcaster};
pub use types::{LiveChannel, LiveEvent, MutationKind};
