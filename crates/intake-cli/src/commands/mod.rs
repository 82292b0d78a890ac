//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod records;
pub mod serve;

/// Equipment intake server and record tools
#[derive(Parser)]
#[command(name = "intake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and live record feed
    Serve(serve::ServeArgs),

    /// Inspect and manage stored records
    #[command(subcommand)]
    Records(records::RecordsCommands),
}

/// Storage locations shared by every command.
#[derive(Args, Clone)]
pub struct StorageArgs {
    /// SQLite database file
    #[arg(long = "db", env = "INTAKE_DB", default_value = "./data/intake.db")]
    pub db_path: PathBuf,

    /// Directory holding uploaded photos
    #[arg(long, env = "INTAKE_MEDIA_DIR", default_value = "./media")]
    pub media_dir: PathBuf,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Records(cmd) => records::execute(cmd).await,
        }
    }
}
