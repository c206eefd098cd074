//! Event stream driver: connect, read, reconnect.
//!
//! One task owns the WebSocket for the mirror's lifetime. Text frames are
//! decoded at the boundary; anything that is not JSON is discarded
//! silently (the backend ACKs client sends with plain `ACK:...` text, so
//! non-JSON frames are expected traffic). Valid events enter the bounded
//! log, and seat-affecting ones trigger a snapshot refresh.
//!
//! A dropped connection moves the mirror into `Reconnecting` and retries
//! with exponential backoff; shutdown sends exactly one Close frame and
//! ends the task without reconnecting.

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::backoff::ReconnectBackoff;
use crate::domain::{LogEntry, StreamEvent};
use crate::service::RefreshHandle;
use crate::shutdown::ShutdownSignal;
use crate::state::{ConnectionStatus, SharedState};

/// Why a connection's read loop ended.
#[derive(Debug, PartialEq, Eq)]
enum StreamExit {
    /// Teardown: the close frame was sent, do not reconnect.
    Shutdown,
    /// The backend closed or the transport failed: reconnect.
    Dropped,
}

/// Runs the event stream until shutdown.
///
/// Every successful connect resets the backoff schedule and requests one
/// resynchronizing seat refresh, since events during a gap are
/// unobservable.
pub async fn run_stream(
    url: Url,
    state: SharedState,
    refresh: RefreshHandle,
    mut backoff: ReconnectBackoff,
    mut signal: ShutdownSignal,
) {
    loop {
        if signal.is_raised() {
            break;
        }

        let connect = tokio::select! {
            connect = connect_async(url.as_str()) => Some(connect),
            () = signal.raised() => None,
        };

        match connect {
            None => break,
            Some(Ok((socket, _response))) => {
                tracing::info!(url = %url, "event stream connected");
                backoff.reset();
                state.set_connection(ConnectionStatus::Connected).await;
                refresh.request();

                if drive(socket, &state, &refresh, &mut signal).await == StreamExit::Shutdown {
                    break;
                }
            }
            Some(Err(err)) => {
                tracing::warn!(%err, url = %url, "event stream connect failed");
            }
        }

        if signal.is_raised() {
            break;
        }

        let delay = backoff.next_delay();
        state
            .set_connection(ConnectionStatus::Reconnecting {
                attempt: backoff.attempt(),
            })
            .await;
        tracing::info!(
            attempt = backoff.attempt(),
            delay_ms = delay.as_millis() as u64,
            "reconnecting event stream"
        );
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = signal.raised() => break,
        }
    }

    state.set_connection(ConnectionStatus::Closed).await;
    tracing::debug!("event stream task stopped");
}

/// Read loop for one established connection.
async fn drive(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: &SharedState,
    refresh: &RefreshHandle,
    signal: &mut ShutdownSignal,
) -> StreamExit {
    let (mut sink, mut frames) = socket.split();

    loop {
        tokio::select! {
            message = frames.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = decode_frame(text.as_str()) {
                        let wants_refresh = event.triggers_seat_refresh();
                        state.record_event(LogEntry::new(event)).await;
                        if wants_refresh {
                            refresh.request();
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::warn!("event stream closed by backend");
                    return StreamExit::Dropped;
                }
                // Binary, ping, and pong frames carry no events.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(%err, "event stream read failed");
                    return StreamExit::Dropped;
                }
            },
            () = signal.raised() => {
                // The single close on teardown.
                if let Err(err) = sink.send(Message::Close(None)).await {
                    tracing::debug!(%err, "close frame not delivered");
                }
                return StreamExit::Shutdown;
            }
        }
    }
}

/// Decodes one text frame, discarding anything that is not JSON.
fn decode_frame(text: &str) -> Option<StreamEvent> {
    match StreamEvent::from_json(text) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!(%err, "discarding non-JSON frame");
            None
        }
    }
}
