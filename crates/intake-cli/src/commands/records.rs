//! Record inspection commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use intake_db::DbPool;
use intake_web::photos::PhotoStore;

use super::StorageArgs;
use crate::output;

#[derive(Subcommand)]
pub enum RecordsCommands {
    /// List records, newest first
    List {
        /// Only records whose text fields contain this term
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of records to show
        #[arg(short, long, default_value = "50")]
        limit: usize,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Show one record with its photos
    Show {
        /// Record ID
        id: i64,

        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Delete a record and its photo files
    Delete {
        /// Record ID
        id: i64,

        #[command(flatten)]
        storage: StorageArgs,
    },
}

pub async fn execute(cmd: RecordsCommands) -> Result<()> {
    match cmd {
        RecordsCommands::List {
            search,
            limit,
            storage,
        } => {
            let pool = open(&storage)?;
            let mut records = match search.as_deref() {
                Some(term) => intake_core::record::search_records(&pool, term)?,
                None => intake_core::record::list_records(&pool, Some(limit))?,
            };
            records.truncate(limit);

            if records.is_empty() {
                println!("{}", "No records found.".dimmed());
            } else {
                output::print_records_table(&records);
            }
        }

        RecordsCommands::Show { id, storage } => {
            let pool = open(&storage)?;
            let record = intake_core::record::get_record(&pool, id)?;
            output::print_record_detail(&record);
        }

        RecordsCommands::Delete { id, storage } => {
            let pool = open(&storage)?;
            let record = intake_core::record::get_record(&pool, id)?;
            let images = intake_core::record::delete_record(&pool, id)?;

            let photos = PhotoStore::new(storage.media_dir.clone()).await?;
            photos.remove_all(&images).await;

            println!(
                "{} Deleted record #{} ({}), {} photo(s) removed",
                "✓".green().bold(),
                record.id,
                record.label(),
                images.len()
            );
        }
    }

    Ok(())
}

fn open(storage: &StorageArgs) -> Result<DbPool> {
    Ok(intake_db::init_pool(&storage.db_path)?)
}
