//! Topic membership.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::connection::ConnectionHandle;

/// Tracks which connections are subscribed to which topic.
///
/// The map is the only shared mutable state of the broadcast subsystem. Writes
/// (`join`/`leave`) take the write lock briefly; `members_of` clones the member
/// set under the read lock, so fan-out never holds the lock while delivering.
#[derive(Default)]
pub struct TopicRegistry {
    topics: RwLock<HashMap<String, HashMap<Uuid, ConnectionHandle>>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection. Joining twice is a no-op, as is joining with a
    /// handle that is already closed. Returns whether the connection was added.
    pub async fn join(&self, topic: &str, handle: &ConnectionHandle) -> bool {
        if handle.is_closed() {
            return false;
        }
        let mut topics = self.topics.write().await;
        let members = topics.entry(topic.to_string()).or_default();
        if members.contains_key(&handle.id()) {
            return false;
        }
        members.insert(handle.id(), handle.clone());
        debug!(topic, conn_id = %handle.id(), members = members.len(), "Connection joined topic");
        true
    }

    /// Unsubscribe a connection. Leaving a topic the connection is not in is a
    /// no-op. Returns whether the connection was removed.
    pub async fn leave(&self, topic: &str, handle: &ConnectionHandle) -> bool {
        let mut topics = self.topics.write().await;
        let Some(members) = topics.get_mut(topic) else {
            return false;
        };
        let removed = members.remove(&handle.id()).is_some();
        let remaining = members.len();
        if remaining == 0 {
            topics.remove(topic);
        }
        if removed {
            debug!(topic, conn_id = %handle.id(), members = remaining, "Connection left topic");
        }
        removed
    }

    /// Point-in-time copy of a topic's members.
    pub async fn members_of(&self, topic: &str) -> Vec<ConnectionHandle> {
        let topics = self.topics.read().await;
        topics
            .get(topic)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of connections subscribed to a topic.
    pub async fn member_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map_or(0, HashMap::len)
    }

    pub async fn is_member(&self, topic: &str, handle: &ConnectionHandle) -> bool {
        let topics = self.topics.read().await;
        topics
            .get(topic)
            .is_some_and(|members| members.contains_key(&handle.id()))
    }
}
