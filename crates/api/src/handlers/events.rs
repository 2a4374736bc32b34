//! Server-sent stream of remote change events.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::AppState;

/// GET /events
///
/// Each change is sent as an SSE event named after its table, with the
/// [`detailhq_events::ChangeEvent`] as JSON data. Slow clients that fall
/// behind skip the missed events.
pub async fn change_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.bus.subscribe()).filter_map(|msg| match msg {
        Ok(change) => Event::default()
            .event(change.table.clone())
            .json_data(&change)
            .ok()
            .map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE client lagged behind change bus");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
