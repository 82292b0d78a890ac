//! Real-time fan-out of record events to dashboard connections.
//!
//! Membership ([`TopicRegistry`]) is kept apart from delivery
//! ([`Broadcaster`]). Each connection owns a bounded queue behind a
//! [`ConnectionHandle`]; publishing only ever `try_send`s into those queues.

pub mod channel;
pub mod connection;
pub mod registry;

pub use channel::Broadcaster;
pub use connection::{ConnectionHandle, Delivery, Frame};
pub use registry::TopicRegistry;
