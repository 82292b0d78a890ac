//! WebSocket session handling for live dashboards.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use intake_core::RECORDS_TOPIC;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::broadcast::{ConnectionHandle, Frame, TopicRegistry};
use crate::state::AppState;

/// Lifecycle of one dashboard connection. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Close frame or end of stream from the client.
    ClientClosed,
    /// Reading from the socket failed.
    NetworkError,
    /// Writing a frame to the socket failed.
    WriteFailed,
    /// The outbound queue overflowed or the handle was closed elsewhere.
    Dropped,
}

/// One connection's subscription to the records topic.
///
/// Created in `Connecting`; [`run`](Self::run) joins the topic, forwards every
/// queued frame to the client and leaves the topic when the connection ends.
pub struct Session {
    registry: Arc<TopicRegistry>,
    handle: ConnectionHandle,
    outbox: mpsc::Receiver<Frame>,
    state: SessionState,
}

impl Session {
    pub fn new(registry: Arc<TopicRegistry>, capacity: usize) -> Self {
        let (handle, outbox) = ConnectionHandle::channel(capacity);
        Self {
            registry,
            handle,
            outbox,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> Uuid {
        self.handle.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Handshake done: subscribe to the records topic.
    pub async fn open(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }
        self.state = SessionState::Open;
        self.registry.join(RECORDS_TOPIC, &self.handle).await;
        let subscribers = self.registry.member_count(RECORDS_TOPIC).await;
        info!(conn_id = %self.id(), subscribers, "WebSocket client connected");
    }

    /// Terminal transition. Unsubscribes and turns further deliveries into no-ops.
    pub async fn close(&mut self, reason: CloseReason) {
        if self.state == SessionState::Closed {
            return;
        }
        let was_open = self.state == SessionState::Open;
        self.state = SessionState::Closed;
        self.handle.close();
        self.registry.leave(RECORDS_TOPIC, &self.handle).await;
        self.outbox.close();
        if was_open {
            info!(
                conn_id = %self.id(),
                ?reason,
                age_ms = self.handle.age().as_millis() as u64,
                dropped = self.handle.drop_count(),
                "WebSocket client disconnected"
            );
        }
    }

    /// Drive the connection until it closes.
    ///
    /// Inbound client messages are read only to detect close; their content is
    /// ignored.
    pub async fn run<S, R, E>(mut self, mut sink: S, mut inbound: R) -> CloseReason
    where
        S: Sink<Message> + Unpin,
        S::Error: Display,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        self.open().await;

        let reason = loop {
            tokio::select! {
                frame = self.outbox.recv() => match frame {
                    Some(frame) => {
                        trace!(conn_id = %self.id(), bytes = frame.len(), "Sending frame");
                        if let Err(e) = sink.send(Message::Text(String::from(&*frame).into())).await {
                            debug!(conn_id = %self.id(), error = %e, "WebSocket send failed");
                            break CloseReason::WriteFailed;
                        }
                    }
                    None => break CloseReason::Dropped,
                },
                msg = inbound.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ClientClosed,
                    Some(Ok(Message::Text(text))) => {
                        debug!(conn_id = %self.id(), len = text.as_str().len(), "Ignoring client message");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(conn_id = %self.id(), error = %e, "WebSocket receive failed");
                        break CloseReason::NetworkError;
                    }
                },
                () = self.handle.closed() => {
                    warn!(conn_id = %self.id(), "Connection dropped by broadcaster");
                    break CloseReason::Dropped;
                }
            }
        };

        self.close(reason).await;
        let _ = sink.close().await;
        reason
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Task cancelled before close(): stop deliveries, the broadcaster
        // prunes the registry entry on its next publish.
        self.handle.close();
    }
}

/// WebSocket upgrade handler for `/ws/records/`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let session = Session::new(state.registry.clone(), state.config.ws_buffer);
    ws.on_failed_upgrade(|e| warn!(error = %e, "WebSocket handshake failed"))
        .on_upgrade(move |socket| async move {
            let (sender, receiver) = socket.split();
            session.run(sender, receiver).await;
        })
}
