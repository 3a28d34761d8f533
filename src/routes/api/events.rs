use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use tokio_stream::{
    StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::server::AppState;

pub fn create_event_routes() -> Router<AppState> {
    Router::new().route("/events", get(stream_invalidations))
}

/// ビュー無効化の通知をSSEで流す。受け取った側は該当コレクションを再取得する
async fn stream_invalidations(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.invalidation.subscribe()).filter_map(|msg| match msg {
        Ok(collection) => Some(Ok::<_, Infallible>(Event::default()
            .event("invalidate")
            .data(collection.as_str()))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Invalidation subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
