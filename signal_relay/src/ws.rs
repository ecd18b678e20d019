//! WebSocket transport for the relay
//!
//! Each accepted socket is split in two: a writer task that owns the sink
//! and drains a bounded outbound queue, and a reader loop that hands text
//! frames to the [`SignalHandler`] and watches client liveness.

use crate::config::Config;
use crate::error::{ClientRequestError, SignalingError};
use crate::handler::SignalHandler;
use crate::state::{Connection, ConnectionHandle, ConnectionId};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt as _, StreamExt as _, stream::SplitSink};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{interval, timeout},
};

/// How long the writer gets to flush the close frame
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Send side of one WebSocket, as seen by the registry
#[derive(Debug, Clone)]
pub struct WsConnection {
    id: ConnectionId,
    tx: mpsc::Sender<Message>,
}

impl WsConnection {
    /// Wrap the outbound queue of connection `id`
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Message>) -> Self {
        Self { id, tx }
    }
}

impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, payload: &str) -> Result<(), SignalingError> {
        self.tx
            .try_send(Message::Text(payload.to_owned().into()))
            .map_err(|error| match error {
                TrySendError::Full(_) => SignalingError::QueueFull(self.id),
                TrySendError::Closed(_) => SignalingError::Closed(self.id),
            })
    }
}

/// Drive one WebSocket until it closes, then report the close to `handler`.
pub async fn run_connection<H>(socket: WebSocket, handler: Arc<H>, config: Arc<Config>)
where
    H: SignalHandler + ?Sized,
{
    let conn_id = ConnectionId::new();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel::<Message>(config.outbound_queue.max(1));
    let conn: ConnectionHandle = Arc::new(WsConnection::new(conn_id, tx.clone()));

    tracing::info!(conn_id = %conn_id, "Connected");

    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    handler.on_open(&conn);

    let client_timeout = config.client_timeout();
    let mut last_heartbeat = Instant::now();
    let mut heartbeat = interval(config.heartbeat_interval());
    // the first tick completes immediately
    heartbeat.tick().await;

    let close_reason = loop {
        tokio::select! {
            msg = ws_receiver.next() => match msg {
                Some(Ok(msg)) => {
                    last_heartbeat = Instant::now();

                    match msg {
                        Message::Text(text) => {
                            handler.on_message(&conn, text.as_str());
                        }
                        Message::Binary(bytes) => {
                            tracing::warn!(
                                conn_id = %conn_id,
                                len = bytes.len(),
                                error = %ClientRequestError::UnsupportedType,
                                "Dropping binary message"
                            );
                        }
                        // pongs for client pings are queued by the socket itself
                        Message::Ping(_) | Message::Pong(_) => {}
                        Message::Close(frame) => {
                            tracing::info!(conn_id = %conn_id, reason = ?frame, "Client initiated close");
                            break frame;
                        }
                    }
                }

                Some(Err(error)) => {
                    tracing::warn!(conn_id = %conn_id, %error, "WebSocket receive error");
                    break None;
                }

                None => {
                    tracing::info!(conn_id = %conn_id, "WebSocket stream ended");
                    break None;
                }
            },

            _ = heartbeat.tick() => {
                if last_heartbeat.elapsed() > client_timeout {
                    tracing::info!(
                        conn_id = %conn_id,
                        "Client has not sent heartbeat in over {client_timeout:?}; disconnecting"
                    );
                    break None;
                }

                send_heartbeat(&tx, conn_id);
            }
        }
    };

    handler.on_close(&conn_id);

    // attempt to close connection gracefully
    let abort_handle = writer_handle.abort_handle();
    let _ = tx.try_send(Message::Close(close_reason));
    drop(conn);
    drop(tx);
    if timeout(CLOSE_TIMEOUT, writer_handle).await.is_err() {
        abort_handle.abort();
    }

    tracing::info!(conn_id = %conn_id, "Disconnected");
}

/// Queue a heartbeat ping. Returns whether it was queued.
fn send_heartbeat(tx: &mpsc::Sender<Message>, conn_id: ConnectionId) -> bool {
    match tx.try_send(Message::Ping(Vec::<u8>::new().into())) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::debug!(conn_id = %conn_id, "Outbound queue full; skipping heartbeat");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(conn_id = %conn_id, "Writer gone; skipping heartbeat");
            false
        }
    }
}

/// Forward queued messages to the WebSocket sink until the queue closes,
/// the sink fails or a close frame has been written.
async fn writer_task(mut ws_sender: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        let closing = matches!(msg, Message::Close(_));

        if ws_sender.send(msg).await.is_err() || closing {
            break;
        }
    }
}
