//! Server-Sent Events stream of revalidation hints.
//!
//! Server-rendered pages subscribe here and refetch a path when a hint for it
//! arrives, e.g. `/` after a like or `/profile/alice` after a follow.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use buzzify_core::RevalidationHint;
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::middleware::AppState;

/// Event sent over the stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SseEvent {
    /// A page should be refetched.
    Revalidate {
        /// Path of the page.
        path: String,
    },
    /// Connection established.
    Connected,
}

impl From<RevalidationHint> for SseEvent {
    fn from(hint: RevalidationHint) -> Self {
        Self::Revalidate { path: hint.path }
    }
}

fn to_event(event: &SseEvent) -> Event {
    Event::default()
        .json_data(event)
        .unwrap_or_else(|_| Event::default().data("error"))
}

/// Revalidation hint stream.
async fn revalidate_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.revalidator.subscribe();

    // Lagged receivers skip the hints they missed.
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| result.ok().map(|hint| Ok(to_event(&SseEvent::from(hint)))));

    let initial = stream::once(async { Ok(to_event(&SseEvent::Connected)) });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// Create the SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stream", get(revalidate_stream))
}
