//! Server configuration.
//!
//! Every setting has a default so the server starts with zero configuration
//! for local development. The CLI overrides them from flags or `INTAKE_*`
//! environment variables.

use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `127.0.0.1`.
    pub host: String,

    /// Port to bind; `0` picks a free port. Default: `8000`.
    pub port: u16,

    /// SQLite database file. Default: `./data/intake.db`.
    pub db_path: PathBuf,

    /// Directory where uploaded photos are written. Default: `./media`.
    pub media_dir: PathBuf,

    /// Public URL prefix for stored photos. When it is a path (starts with
    /// `/`) the server also serves `media_dir` under it. Default: `/media/`.
    pub media_url: String,

    /// Maximum size of an intake submission, photos included. Default: 20 MiB.
    pub max_upload_bytes: usize,

    /// Frames buffered per WebSocket connection before it is considered dead.
    /// Default: `32`.
    pub ws_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            db_path: PathBuf::from("./data/intake.db"),
            media_dir: PathBuf::from("./media"),
            media_url: "/media/".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            ws_buffer: 32,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route under which `media_dir` is served, if the media URL is local.
    pub fn media_mount(&self) -> Option<&str> {
        let mount = self.media_url.trim_end_matches('/');
        (self.media_url.starts_with('/') && !mount.is_empty()).then_some(mount)
    }
}
