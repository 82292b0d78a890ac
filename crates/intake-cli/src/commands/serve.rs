//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use intake_web::ServerConfig;
use std::path::PathBuf;

use super::StorageArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "INTAKE_PORT", default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "INTAKE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Public URL prefix for stored photos
    #[arg(long, env = "INTAKE_MEDIA_URL", default_value = "/media/")]
    pub media_url: String,

    /// Maximum size of one intake submission, in bytes
    #[arg(long, env = "INTAKE_MAX_UPLOAD", default_value = "20971520")]
    pub max_upload: usize,

    /// Frames buffered per WebSocket connection
    #[arg(long, env = "INTAKE_WS_BUFFER", default_value = "32")]
    pub ws_buffer: usize,

    /// Also write logs to this file
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            db_path: self.storage.db_path,
            media_dir: self.storage.media_dir,
            media_url: self.media_url,
            max_upload_bytes: self.max_upload,
            ws_buffer: self.ws_buffer.max(1),
        }
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.into_config();

    println!();
    println!("  {} {}", "Intake".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}  http://{}", "Dashboard".green(), config.bind_addr());
    println!("  {}       http://{}/api/records", "API".green(), config.bind_addr());
    println!("  {}  ws://{}/ws/records/", "WebSocket".green(), config.bind_addr());
    println!("  {}   {}", "Database".green(), config.db_path.display());
    println!("  {}      {}", "Media".green(), config.media_dir.display());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    intake_web::run_server(config).await?;

    Ok(())
}
