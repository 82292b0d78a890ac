//! Events pushed to live dashboard connections.

use serde::{Deserialize, Serialize};

use crate::record::payload::RecordPayload;

/// Topic every dashboard connection subscribes to.
pub const RECORDS_TOPIC: &str = "records";

/// An event fanned out to subscribers. Never persisted.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum BroadcastEvent {
    /// A new intake record was persisted.
    #[serde(rename = "record.created")]
    RecordCreated(RecordPayload),
}

impl BroadcastEvent {
    /// Wire tag of the event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RecordCreated(_) => "record.created",
        }
    }
}
