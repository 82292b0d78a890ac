//! Intake Database Layer
//!
//! SQLite persistence for equipment intake records and their photos.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult};
pub use rusqlite::Connection;

/// Open (or create) the database at `path` and bring its schema up to date.
pub fn init_pool(path: &std::path::Path) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}

/// In-memory database with the schema applied. Used by tests across the workspace.
pub fn init_in_memory() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
