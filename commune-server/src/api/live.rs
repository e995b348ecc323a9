//! Server-sent event streams bridging the in-process broadcaster to HTTP.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use commune_core::events::{LiveChannel, LiveEvent};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// `GET /api/live/alerts`
pub async fn alerts_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(&state, LiveChannel::Alerts)
}

/// `GET /api/live/incidents`
pub async fn incidents_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    live_stream(&state, LiveChannel::Incidents)
}

/// Subscribe to one channel and adapt its events to the SSE wire format.
///
/// A subscriber that lags past the channel buffer skips the missed events
/// and keeps receiving; clients are expected to refetch state on such gaps.
fn live_stream(
    state: &AppState,
    channel: LiveChannel,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let receiver = state.live.subscribe(channel);
    let stream = BroadcastStream::new(receiver).filter_map(move |item| match item {
        Ok(event) => Some(Ok(to_sse_event(event)?)),
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            tracing::warn!(channel = channel.entity(), missed, "live subscriber lagged");
            None
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: LiveEvent) -> Option<Event> {
    let name = event.name();
    match Event::default().event(&name).json_data(&event.payload) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::error!(event = %name, error = %e, "dropping unserializable live event");
            None
        }
    }
}
