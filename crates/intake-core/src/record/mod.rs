//! Equipment intake records.

pub mod form;
pub mod model;
pub mod payload;

use chrono::Utc;
use intake_db::queries::photos as photo_queries;
use intake_db::queries::records::{self as queries, InsertRecord, RecordRow};
use intake_db::{DbPool, DbResult};
use intake_db::Connection;
use tracing::{debug, info};

use crate::error::{IntakeError, IntakeResult};
use form::NewRecord;
use model::{format_timestamp, EquipmentRecord};

/// Persist a validated record together with its already-stored photo images.
///
/// Record and photo rows are written in a single transaction.
pub fn create_record(pool: &DbPool, new: &NewRecord, images: &[String]) -> IntakeResult<EquipmentRecord> {
    let created_at = format_timestamp(&Utc::now());

    let id = pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        let id = queries::insert_record(
            &tx,
            &InsertRecord {
                vci_serial: &new.vci_serial,
                tablet_serial: &new.tablet_serial,
                prog_serial: &new.prog_serial,
                client_name: &new.client_name,
                email: &new.email,
                phone: &new.phone,
                request_text: &new.request_text,
                created_at: &created_at,
            },
        )?;
        for image in images {
            let uploaded_at = format_timestamp(&Utc::now());
            photo_queries::insert_photo(&tx, id, image, &uploaded_at)?;
        }
        tx.commit()?;
        Ok(id)
    })?;

    let record = get_record(pool, id)?;
    info!(record_id = record.id, photos = record.photos.len(), "Created equipment record");
    Ok(record)
}

/// Get a record and its photos by ID.
pub fn get_record(pool: &DbPool, id: i64) -> IntakeResult<EquipmentRecord> {
    let (row, photos) = pool
        .with_conn(|conn| {
            let row = queries::get_record(conn, id)?;
            let photos = photo_queries::list_photos(conn, id)?;
            Ok((row, photos))
        })
        .map_err(|e| IntakeError::from_db(e, id))?;
    EquipmentRecord::from_rows(row, photos)
}

/// List records newest first, with photos.
pub fn list_records(pool: &DbPool, limit: Option<usize>) -> IntakeResult<Vec<EquipmentRecord>> {
    load_all(pool, |conn| queries::list_records(conn, limit))
}

/// Records whose text fields contain `term`, newest first.
pub fn search_records(pool: &DbPool, term: &str) -> IntakeResult<Vec<EquipmentRecord>> {
    let term = term.trim();
    if term.is_empty() {
        return list_records(pool, None);
    }
    debug!(term, "Searching records");
    load_all(pool, |conn| queries::search_records(conn, term))
}

/// Delete a record and its photo rows. Returns the image paths that were
/// attached so the caller can remove the files.
pub fn delete_record(pool: &DbPool, id: i64) -> IntakeResult<Vec<String>> {
    let images = pool
        .with_conn_mut(|conn| queries::delete_record(conn, id))
        .map_err(|e| IntakeError::from_db(e, id))?;
    info!(record_id = id, photos = images.len(), "Deleted equipment record");
    Ok(images)
}

fn load_all<F>(pool: &DbPool, select: F) -> IntakeResult<Vec<EquipmentRecord>>
where
    F: FnOnce(&Connection) -> DbResult<Vec<RecordRow>>,
{
    let loaded = pool.with_conn(|conn| {
        select(conn)?
            .into_iter()
            .map(|row| {
                let photos = photo_queries::list_photos(conn, row.id)?;
                Ok((row, photos))
            })
            .collect::<DbResult<Vec<_>>>()
    })?;

    loaded
        .into_iter()
        .map(|(row, photos)| EquipmentRecord::from_rows(row, photos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::form::RecordForm;

    fn new_record(client_name: &str) -> NewRecord {
        RecordForm {
            client_name: client_name.to_string(),
            vci_serial: "VCI-001".to_string(),
            ..RecordForm::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_create_with_photos() {
        let pool = intake_db::init_in_memory().unwrap();
        let images = vec![
            "records/photos/first.jpg".to_string(),
            "records/photos/second.jpg".to_string(),
        ];
        let record = create_record(&pool, &new_record("Acme"), &images).unwrap();
        assert_eq!(record.client_name, "Acme");
        assert_eq!(record.photos.len(), 2);
        // Newest upload first.
        assert_eq!(record.photos[0].image, "records/photos/second.jpg");
        assert_eq!(record.photos[1].image, "records/photos/first.jpg");
        assert!(record.photos.iter().all(|p| p.record_id == record.id));
    }

    #[test]
    fn test_get_missing() {
        let pool = intake_db::init_in_memory().unwrap();
        let err = get_record(&pool, 5).unwrap_err();
        assert!(matches!(err, IntakeError::RecordNotFound(5)));
    }

    #[test]
    fn test_list_and_search() {
        let pool = intake_db::init_in_memory().unwrap();
        create_record(&pool, &new_record("Acme"), &[]).unwrap();
        create_record(&pool, &new_record("Globex"), &[]).unwrap();

        let all = list_records(&pool, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].client_name, "Globex");

        let found = search_records(&pool, "glob").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].client_name, "Globex");

        assert_eq!(search_records(&pool, "  ").unwrap().len(), 2);
    }

    #[test]
    fn test_delete_returns_images() {
        let pool = intake_db::init_in_memory().unwrap();
        let record = create_record(&pool, &new_record("Acme"), &["records/photos/x.png".to_string()]).unwrap();
        let images = delete_record(&pool, record.id).unwrap();
        assert_eq!(images, vec!["records/photos/x.png".to_string()]);
        assert!(matches!(get_record(&pool, record.id), Err(IntakeError::RecordNotFound(_))));
        assert!(matches!(delete_record(&pool, record.id), Err(IntakeError::RecordNotFound(_))));
    }
}
