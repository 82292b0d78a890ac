//! Wire representation of a record.

use serde::{Deserialize, Serialize};

use super::model::{format_timestamp, EquipmentRecord};

/// A record as sent to browsers, both in the create response and in
/// `record.created` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub id: i64,
    pub client_name: String,
    pub vci_serial: String,
    pub tablet_serial: String,
    pub prog_serial: String,
    pub email: String,
    pub phone: String,
    pub request_text: String,
    pub created_at: String,
    /// Photo URLs, most recently uploaded first.
    pub photos: Vec<String>,
}

impl RecordPayload {
    /// Serialize a loaded record. `media_url` is the public prefix under which
    /// stored images are served.
    pub fn from_record(record: &EquipmentRecord, media_url: &str) -> Self {
        Self {
            id: record.id,
            client_name: record.client_name.clone(),
            vci_serial: record.vci_serial.clone(),
            tablet_serial: record.tablet_serial.clone(),
            prog_serial: record.prog_serial.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            request_text: record.request_text.clone(),
            created_at: format_timestamp(&record.created_at),
            photos: record
                .photos
                .iter()
                .map(|photo| media_url_for(media_url, &photo.image))
                .collect(),
        }
    }
}

/// Join the media prefix and a stored relative path with exactly one slash.
pub fn media_url_for(media_url: &str, image: &str) -> String {
    format!(
        "{}/{}",
        media_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::model::Photo;
    use chrono::{TimeZone, Utc};

    fn record() -> EquipmentRecord {
        EquipmentRecord {
            id: 7,
            vci_serial: "VCI-001".to_string(),
            tablet_serial: String::new(),
            prog_serial: "PRG-2".to_string(),
            client_name: "Acme".to_string(),
            email: "ops@acme.test".to_string(),
            phone: "555-0100".to_string(),
            request_text: "Replace cable".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            photos: vec![
                Photo {
                    id: 2,
                    record_id: 7,
                    image: "records/photos/two.jpg".to_string(),
                    uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 2).unwrap(),
                },
                Photo {
                    id: 1,
                    record_id: 7,
                    image: "records/photos/one.jpg".to_string(),
                    uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 1).unwrap(),
                },
            ],
        }
    }

    #[test]
    fn test_from_record() {
        let payload = RecordPayload::from_record(&record(), "/media/");
        assert_eq!(payload.id, 7);
        assert_eq!(payload.client_name, "Acme");
        assert_eq!(payload.prog_serial, "PRG-2");
        assert_eq!(payload.created_at, "2024-05-01T10:00:00.000000+00:00");
        assert_eq!(
            payload.photos,
            vec!["/media/records/photos/two.jpg", "/media/records/photos/one.jpg"]
        );
    }

    #[test]
    fn test_deterministic() {
        let a = serde_json::to_string(&RecordPayload::from_record(&record(), "/media")).unwrap();
        let b = serde_json::to_string(&RecordPayload::from_record(&record(), "/media")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_media_url_for() {
        assert_eq!(media_url_for("/media", "a.jpg"), "/media/a.jpg");
        assert_eq!(media_url_for("/media/", "/a.jpg"), "/media/a.jpg");
        assert_eq!(
            media_url_for("https://cdn.test/m/", "records/photos/a.jpg"),
            "https://cdn.test/m/records/photos/a.jpg"
        );
    }
}
