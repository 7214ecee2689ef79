//! Graph inspection commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use interlink_core::{Domain, Settings};

use super::{connect_graph, parse_domain};
use crate::output;

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Show node and relationship counts
    Status,

    /// List the edges currently leaving a subject
    Show {
        /// Subject domain (b2b or b2c)
        #[arg(value_parser = parse_domain)]
        domain: Domain,
        /// Vendor user id or customer id
        subject_id: String,
    },
}

pub async fn execute(cmd: GraphCommands, settings: &Settings) -> Result<()> {
    let client = connect_graph(settings).await?;

    match cmd {
        GraphCommands::Status => {
            println!("{}", "Interaction Graph Status".bold());
            println!("{}", "─".repeat(40));

            let counts = client.get_counts().await?;
            println!("  Nodes:         {}", counts.nodes.to_string().cyan());
            println!("  Relationships: {}", counts.relationships.to_string().cyan());

            println!("{}", "─".repeat(40));
            Ok(())
        }
        GraphCommands::Show { domain, subject_id } => {
            let label = interlink_graph::subject_label(domain);
            let edges = interlink_graph::queries::edges::subject_edges(&client, label, &subject_id).await?;

            println!("{} [{}] {}", "Subject".bold(), label.cyan(), subject_id.yellow());
            output::print_edges(&edges);
            Ok(())
        }
    }
}
