//! Outbox inspection commands.

use anyhow::Result;
use clap::Subcommand;

use interlink_core::{OutboxStore, Settings};
use interlink_db::PgOutboxStore;

use super::connect_db;
use crate::output;

#[derive(Subcommand)]
pub enum OutboxCommands {
    /// List events that reached the attempt ceiling
    Exhausted {
        /// Maximum rows to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

pub async fn execute(cmd: OutboxCommands, settings: &Settings) -> Result<()> {
    match cmd {
        OutboxCommands::Exhausted { limit } => {
            let pool = connect_db(settings).await?;
            let store = PgOutboxStore::new(pool.clone());

            let total = store.count_exhausted(settings.max_attempts).await?;
            let events = store.list_exhausted(settings.max_attempts, limit).await?;
            pool.close().await;

            output::print_exhausted_table(&events, total);
            Ok(())
        }
    }
}
