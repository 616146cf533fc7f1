//! `GET /events`: the dashboard's live order-event stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;

use tavola_common::ClientId;

use crate::AppState;

use super::broadcaster::SseBroadcaster;
use super::transport::ChannelTransport;

/// Interval between keep-alive comments on idle streams.
const KEEP_ALIVE_SECS: u64 = 15;

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(stream_events))
}

/// Removes the connection from the registry when the response body is dropped
/// (client navigated away or the socket closed).
struct ConnectionGuard {
    broadcaster: Arc<SseBroadcaster>,
    client_id: String,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.broadcaster.unregister_connection(&self.client_id);
        tracing::info!(client_id = %self.client_id, "sse client disconnected");
    }
}

#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    responses(
        (status = 200, description = "Order notification event stream", content_type = "text/event-stream"),
    ),
)]
pub async fn stream_events(State(state): State<AppState>) -> impl IntoResponse {
    let client_id = ClientId::generate().to_string();
    let (transport, rx) = ChannelTransport::new();
    state
        .broadcaster
        .register_connection(client_id.clone(), Arc::new(transport));

    tracing::info!(%client_id, connections = state.broadcaster.connection_count(), "sse client connected");

    let guard = ConnectionGuard {
        broadcaster: state.broadcaster.clone(),
        client_id,
    };

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(frame_stream(rx, guard)).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(KEEP_ALIVE_SECS))
                .text("keep-alive"),
        ),
    )
}

fn frame_stream(
    rx: tokio::sync::mpsc::Receiver<super::transport::SseFrame>,
    guard: ConnectionGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    ReceiverStream::new(rx).map(move |frame| {
        let _guard = &guard;
        Ok(frame.into_event())
    })
}
