//! Fire-and-forget fan-out.

use std::sync::Arc;

use intake_core::BroadcastEvent;
use tracing::{debug, warn};

use super::connection::{Delivery, Frame};
use super::registry::TopicRegistry;

/// Publishes events to every current member of a topic.
///
/// `publish` never waits on a recipient and reports nothing back: a dead or
/// slow connection only affects itself.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<TopicRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to the topic's membership snapshot taken at call time.
    ///
    /// Returns once every member's queue has been offered the frame. Members
    /// whose queue was full or closed are dropped from the topic.
    pub async fn publish(&self, topic: &str, event: &BroadcastEvent) {
        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                warn!(event_type = event.event_type(), error = %e, "Failed to serialize event");
                return;
            }
        };
        let frame: Frame = Arc::from(json);

        let members = self.registry.members_of(topic).await;
        if members.is_empty() {
            debug!(topic, event_type = event.event_type(), "No subscribers, event discarded");
            return;
        }

        let mut queued = 0usize;
        let mut dead = Vec::new();
        for member in &members {
            match member.deliver(frame.clone()) {
                Delivery::Queued => queued += 1,
                Delivery::Full => {
                    warn!(conn_id = %member.id(), topic, "Subscriber queue full, dropping connection");
                    dead.push(member);
                }
                Delivery::Closed => {
                    debug!(conn_id = %member.id(), topic, "Subscriber already closed");
                    dead.push(member);
                }
            }
        }

        debug!(
            topic,
            event_type = event.event_type(),
            recipients = members.len(),
            queued,
            "Broadcast event"
        );

        for member in dead {
            self.registry.leave(topic, member).await;
        }
    }
}
