//! Manual resync of a single subject.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use interlink_core::{Domain, EventOp, Settings};
use interlink_worker::Plan;

use super::{connect_db, parse_domain, pipeline, Stores};
use crate::output;

#[derive(Args)]
pub struct ResyncArgs {
    /// Subject domain (b2b or b2c)
    #[arg(value_parser = parse_domain)]
    pub domain: Domain,

    /// Vendor user id or customer id
    pub subject_id: String,

    /// Remove the subject from the graph if it no longer exists at the source
    #[arg(long)]
    pub delete: bool,

    /// Print the planned mutation as JSON instead of applying it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn execute(args: ResyncArgs, settings: &Settings) -> Result<()> {
    let op = if args.delete { EventOp::Delete } else { EventOp::Update };

    if args.dry_run {
        return dry_run(&args, op, settings).await;
    }

    let stores = Stores::connect(settings).await?;
    let result = stores.router().sync_subject(args.domain, &args.subject_id, op).await;
    stores.close().await;

    output::print_outcome(args.domain, &args.subject_id, &result?);
    Ok(())
}

async fn dry_run(args: &ResyncArgs, op: EventOp, settings: &Settings) -> Result<()> {
    let pool = connect_db(settings).await?;
    let plan = pipeline(args.domain, &pool).plan(&args.subject_id, op).await;
    pool.close().await;

    match plan? {
        Plan::Write(mutation) => println!("{}", serde_json::to_string_pretty(&mutation)?),
        Plan::SkipMissingSubject => println!(
            "{} {} not found; nothing would be written (pass --delete to remove it from the graph)",
            args.domain.to_string().cyan(),
            args.subject_id.yellow()
        ),
    }
    Ok(())
}
