use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{scoreboard::ScoreboardResponse, sse::ServerEvent},
    state::SharedState,
};

/// Subscribe to the scoreboard SSE stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.scoreboard_sse().subscribe()
}

/// Push a snapshot to every connected display.
pub fn broadcast_snapshot(state: &SharedState, snapshot: &ScoreboardResponse) {
    match ServerEvent::scoreboard(snapshot) {
        Ok(event) => state.scoreboard_sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to serialize scoreboard event"),
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until the client
/// disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // Skip lagged messages but keep the stream alive.
                        Err(RecvError::Lagged(_)) => continue,
                    }
                }
            }
        }

        info!("scoreboard SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
