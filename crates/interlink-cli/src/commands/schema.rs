//! Graph schema commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use interlink_core::Settings;

use super::connect_graph;

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Create node uniqueness constraints (idempotent)
    Init,
}

pub async fn execute(cmd: SchemaCommands, settings: &Settings) -> Result<()> {
    match cmd {
        SchemaCommands::Init => {
            let client = connect_graph(settings).await?;
            let applied = interlink_graph::schema::initialize_schema(&client).await?;
            println!("{} {} constraints ensured", "✓".green(), applied);
            Ok(())
        }
    }
}
