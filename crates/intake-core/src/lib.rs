//! Intake Core Library
//!
//! Domain models and business logic for equipment intake: records and their
//! photos, form validation, the wire representation of a record, and the
//! event broadcast to live dashboards.

pub mod error;
pub mod event;
pub mod record;

pub use error::{IntakeError, IntakeResult};
pub use event::{BroadcastEvent, RECORDS_TOPIC};
pub use record::form::{FieldErrors, NewRecord, RecordForm};
pub use record::model::{EquipmentRecord, Photo};
pub use record::payload::RecordPayload;
