//! Equipment record queries.

use crate::pool::{DbError, DbResult};
use rusqlite::{params, Connection, Row};

const RECORD_COLUMNS: &str = "id, vci_serial, tablet_serial, prog_serial, client_name,
                              email, phone, request_text, created_at";

/// Record row from database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: i64,
    pub vci_serial: String,
    pub tablet_serial: String,
    pub prog_serial: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub request_text: String,
    pub created_at: String,
}

/// Column values for a new record. `created_at` is RFC 3339.
#[derive(Debug, Clone, Copy)]
pub struct InsertRecord<'a> {
    pub vci_serial: &'a str,
    pub tablet_serial: &'a str,
    pub prog_serial: &'a str,
    pub client_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub request_text: &'a str,
    pub created_at: &'a str,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        vci_serial: row.get(1)?,
        tablet_serial: row.get(2)?,
        prog_serial: row.get(3)?,
        client_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        request_text: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Insert a record and return its new id.
pub fn insert_record(conn: &Connection, record: &InsertRecord<'_>) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO equipment_records
            (vci_serial, tablet_serial, prog_serial, client_name, email, phone, request_text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.vci_serial,
            record.tablet_serial,
            record.prog_serial,
            record.client_name,
            record.email,
            record.phone,
            record.request_text,
            record.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a record by ID.
pub fn get_record(conn: &Connection, id: i64) -> DbResult<RecordRow> {
    conn.query_row(
        &format!("SELECT {RECORD_COLUMNS} FROM equipment_records WHERE id = ?1"),
        params![id],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("Record: {}", id)),
        e => DbError::Connection(e),
    })
}

/// List records, newest first.
pub fn list_records(conn: &Connection, limit: Option<usize>) -> DbResult<Vec<RecordRow>> {
    let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM equipment_records
         ORDER BY created_at DESC, id DESC
         LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], map_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Case-insensitive substring search over the searchable text columns.
pub fn search_records(conn: &Connection, term: &str) -> DbResult<Vec<RecordRow>> {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{}%", escaped);
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM equipment_records
         WHERE client_name LIKE ?1 ESCAPE '\\'
            OR vci_serial LIKE ?1 ESCAPE '\\'
            OR tablet_serial LIKE ?1 ESCAPE '\\'
            OR prog_serial LIKE ?1 ESCAPE '\\'
            OR email LIKE ?1 ESCAPE '\\'
            OR phone LIKE ?1 ESCAPE '\\'
            OR request_text LIKE ?1 ESCAPE '\\'
         ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![pattern], map_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Delete a record. Its photo rows cascade; the returned image paths are the
/// files the caller should remove from storage.
pub fn delete_record(conn: &mut Connection, id: i64) -> DbResult<Vec<String>> {
    let tx = conn.transaction()?;
    let images = {
        let mut stmt = tx.prepare("SELECT image FROM photos WHERE record_id = ?1")?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    };
    let deleted = tx.execute("DELETE FROM equipment_records WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("Record: {}", id)));
    }
    tx.commit()?;
    Ok(images)
}
