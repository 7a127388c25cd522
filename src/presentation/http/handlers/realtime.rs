//! Server-Sent-Events stream of monitoring updates.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures_util::stream::{self, Stream, StreamExt};
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::presentation::http::state::AppState;

/// Opens the event stream: one `connected` event up front, then every
/// subscriber event as a `data:` frame. Dropping the connection drops the
/// receiver, which unsubscribes on the next fan-out.
pub async fn realtime_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.realtime.subscribe().await;

    let connected = Event::default().event("connected").data(
        json!({
            "type": "connected",
            "timestamp": Utc::now(),
        })
        .to_string(),
    );

    let updates = UnboundedReceiverStream::new(rx)
        .map(|event| Ok(Event::default().data(event.to_frame().to_string())));

    let stream = stream::once(async move { Ok(connected) }).chain(updates);
    Sse::new(stream).keep_alive(KeepAlive::default())
}
