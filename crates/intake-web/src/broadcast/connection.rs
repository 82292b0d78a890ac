//! Per-connection delivery handle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Notify};
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// A serialized outbound text frame, shared between all recipients of an event.
pub type Frame = Arc<str>;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame is in the connection's queue.
    Queued,
    /// The connection was already closed; nothing was sent.
    Closed,
    /// The queue was full. The connection is now considered dead.
    Full,
}

/// Cheap, cloneable handle to one live connection's outbound queue.
///
/// Identity is the connection id: clones compare equal.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<Inner>,
}

struct Inner {
    id: Uuid,
    tx: mpsc::Sender<Frame>,
    closed: AtomicBool,
    notify: Notify,
    dropped: AtomicU64,
    connected_at: Instant,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                tx,
                closed: AtomicBool::new(false),
                notify: Notify::new(),
                dropped: AtomicU64::new(0),
                connected_at: Instant::now(),
            }),
        };
        (handle, rx)
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Queue a frame without waiting.
    ///
    /// A full or closed queue marks the handle closed; later calls are no-ops.
    pub fn deliver(&self, frame: Frame) -> Delivery {
        if self.is_closed() {
            return Delivery::Closed;
        }
        match self.inner.tx.try_send(frame) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                self.close();
                Delivery::Full
            }
            Err(TrySendError::Closed(_)) => {
                self.close();
                Delivery::Closed
            }
        }
    }

    /// Mark the connection closed and wake its session task. Irreversible.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_one();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Frames lost to a full queue.
    pub fn drop_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    pub fn age(&self) -> Duration {
        self.inner.connected_at.elapsed()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ConnectionHandle {}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}
