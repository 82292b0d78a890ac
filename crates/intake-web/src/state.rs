//! Application state.

use std::sync::Arc;

use intake_db::DbPool;

use crate::broadcast::{Broadcaster, TopicRegistry};
use crate::config::ServerConfig;
use crate::photos::PhotoStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub registry: Arc<TopicRegistry>,
    pub broadcaster: Broadcaster,
    pub photos: PhotoStore,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, photos: PhotoStore, config: ServerConfig) -> Self {
        let registry = Arc::new(TopicRegistry::new());
        Self {
            db,
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            photos,
            config: Arc::new(config),
        }
    }
}
