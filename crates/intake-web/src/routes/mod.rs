//! Route handlers.

pub mod dashboard;
pub mod health;
pub mod records;

use intake_db::DbPool;
use std::sync::Arc;

use crate::error::WebError;

/// Run a synchronous database call off the async workers.
pub(crate) async fn blocking<T, F>(db: &Arc<DbPool>, f: F) -> Result<T, WebError>
where
    T: Send + 'static,
    F: FnOnce(&DbPool) -> intake_core::IntakeResult<T> + Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| WebError::Internal(format!("Database task failed: {}", e)))?
        .map_err(WebError::from)
}
