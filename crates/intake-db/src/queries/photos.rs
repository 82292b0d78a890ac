//! Photo queries.

use crate::pool::{DbError, DbResult};
use rusqlite::{params, Connection};

/// Photo row from database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRow {
    pub id: i64,
    pub record_id: i64,
    pub image: String,
    pub uploaded_at: String,
}

/// Attach a stored image to a record.
pub fn insert_photo(conn: &Connection, record_id: i64, image: &str, uploaded_at: &str) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO photos (record_id, image, uploaded_at) VALUES (?1, ?2, ?3)",
        params![record_id, image, uploaded_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Photos of a record, most recently uploaded first.
pub fn list_photos(conn: &Connection, record_id: i64) -> DbResult<Vec<PhotoRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, record_id, image, uploaded_at FROM photos
         WHERE record_id = ?1
         ORDER BY uploaded_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![record_id], |row| {
        Ok(PhotoRow {
            id: row.get(0)?,
            record_id: row.get(1)?,
            image: row.get(2)?,
            uploaded_at: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}
