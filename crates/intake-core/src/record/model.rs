//! Record domain models.

use chrono::{DateTime, SecondsFormat, Utc};
use intake_db::queries::photos::PhotoRow;
use intake_db::queries::records::RecordRow;

use crate::error::{IntakeError, IntakeResult};

/// An equipment intake record with its photos loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRecord {
    pub id: i64,
    pub vci_serial: String,
    pub tablet_serial: String,
    pub prog_serial: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub request_text: String,
    pub created_at: DateTime<Utc>,
    /// Most recently uploaded first.
    pub photos: Vec<Photo>,
}

/// An image attached to exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: i64,
    pub record_id: i64,
    /// Storage path relative to the media root.
    pub image: String,
    pub uploaded_at: DateTime<Utc>,
}

impl EquipmentRecord {
    /// Build a record from its row and photo rows.
    pub fn from_rows(row: RecordRow, photos: Vec<PhotoRow>) -> IntakeResult<Self> {
        let mut photos = photos
            .into_iter()
            .map(Photo::from_row)
            .collect::<IntakeResult<Vec<_>>>()?;
        sort_photos(&mut photos);

        Ok(Self {
            id: row.id,
            vci_serial: row.vci_serial,
            tablet_serial: row.tablet_serial,
            prog_serial: row.prog_serial,
            client_name: row.client_name,
            email: row.email,
            phone: row.phone,
            request_text: row.request_text,
            created_at: parse_timestamp(&row.created_at)?,
            photos,
        })
    }

    /// Label used in logs and CLI output.
    pub fn label(&self) -> String {
        if self.vci_serial.is_empty() {
            format!("{} - no VCI", self.client_name)
        } else {
            format!("{} - {}", self.client_name, self.vci_serial)
        }
    }
}

impl Photo {
    /// Create a Photo from a database row.
    pub fn from_row(row: PhotoRow) -> IntakeResult<Self> {
        Ok(Self {
            id: row.id,
            record_id: row.record_id,
            image: row.image,
            uploaded_at: parse_timestamp(&row.uploaded_at)?,
        })
    }
}

/// Upload time descending, newer id first on ties.
pub fn sort_photos(photos: &mut [Photo]) {
    photos.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// ISO-8601 rendering used both in storage and on the wire.
///
/// Fixed-width so stored values sort lexicographically.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub(crate) fn parse_timestamp(s: &str) -> IntakeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| IntakeError::InvalidTimestamp(s.to_string()))
}
